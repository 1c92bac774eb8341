use anyhow::Context;
use clap::{Parser, Subcommand};
use jwks_mock_core::AppConfig;
use jwks_mock_server::JwksServer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jwks-mock",
    version,
    about = "Development JWT issuer with a JWKS endpoint and token introspection"
)]
struct Cli {
    /// YAML configuration file. Environment variables override its values.
    #[arg(long, short, global = true, env = "JWKS_MOCK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Start the HTTP server (default).
    Serve,

    /// Print the effective configuration as YAML and exit.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config loading logs ignored environment values; surface them before the
    // configured subscriber exists.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || {
        AppConfig::load(cli.config.as_deref())
    })
    .context("failed to load configuration")?;

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => {
            init_logging(&config.logging.level);
            serve(config).await
        }
        Command::Config => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(keys = ?config.initial_keys.key_ids, "generating initial keys");

    let server = tokio::task::spawn_blocking(move || JwksServer::new(config))
        .await
        .context("key generation task failed")?
        .context("failed to initialize keys")?;

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["jwks-mock"]).unwrap();
        assert_eq!(cli.cmd.unwrap_or(Command::Serve), Command::Serve);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["jwks-mock", "config", "--config", "dev.yaml"]).unwrap();
        assert_eq!(cli.cmd, Some(Command::Config));
        assert_eq!(cli.config, Some(PathBuf::from("dev.yaml")));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["jwks-mock", "launch"]).is_err());
    }
}
