//! Configuration types for jwks-mock.
//!
//! A configuration file is optional. Every section falls back to its defaults, so a
//! file only needs to list the values it changes:
//!
//! ```yaml
//! jwt:
//!   issuer: "http://auth.local"
//!   audience: "orders-api"
//! initial_keys:
//!   key_ids: ["primary", "secondary"]
//! ```

pub mod jwt;
pub mod keys;
pub mod server;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use jwt::JwtConfig;
pub use keys::InitialKeysConfig;
pub use server::ServerConfig;

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerConfig,

    /// Issuer and audience for issued tokens.
    pub jwt: JwtConfig,

    /// Keys generated at startup.
    #[serde(alias = "keys")]
    pub initial_keys: InitialKeysConfig,

    /// Log filter used when `RUST_LOG` is not set.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "jwks_mock_keys=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional YAML file, then apply environment
    /// overrides from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a YAML file without applying environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to `()`, not to an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Unparseable numeric values are ignored and the previous value is kept.
    /// `KEY_IDS` takes precedence over `KEY_COUNT`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(port) = var("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid PORT"),
            }
        }

        if let Some(host) = var("HOST") {
            self.server.host = host;
        }

        if let Some(issuer) = var("JWT_ISSUER") {
            self.jwt.issuer = issuer;
        }

        if let Some(audience) = var("JWT_AUDIENCE") {
            self.jwt.audience = audience;
        }

        if let Some(key_ids) = var("KEY_IDS") {
            let ids: Vec<String> = key_ids.split(',').map(|id| id.trim().to_string()).collect();
            self.initial_keys.count = ids.len();
            self.initial_keys.key_ids = ids;
        } else if let Some(count) = var("KEY_COUNT") {
            match count.trim().parse::<usize>() {
                Ok(count) if count > 0 => {
                    if self.initial_keys.key_ids.len() != count {
                        self.initial_keys.generate_ids(count);
                    } else {
                        self.initial_keys.count = count;
                    }
                }
                _ => tracing::warn!(value = %count, "ignoring invalid KEY_COUNT"),
            }
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
