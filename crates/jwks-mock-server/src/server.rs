//! Server lifecycle: bind, serve, shut down on signal.

use crate::error::ServerError;
use crate::routes::{self, JWKS_PATH};
use crate::state::AppState;
use jwks_mock_core::AppConfig;
use std::future::Future;
use tokio::net::TcpListener;

/// The jwks-mock HTTP server.
pub struct JwksServer {
    state: AppState,
}

impl JwksServer {
    /// Create a server, generating the configured initial keys.
    ///
    /// Key generation failure is returned as [`ServerError::KeyInitialization`].
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        Ok(Self::from_state(AppState::new(config)?))
    }

    /// Create a server around existing state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Bind the configured address and serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.state.config().server.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.log_startup(&listener);

        let app = routes::create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("server stopped");
        Ok(())
    }

    fn log_startup(&self, listener: &TcpListener) {
        let config = self.state.config();
        let address = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| config.server.bind_address());

        tracing::info!(
            address = %address,
            issuer = %config.jwt.issuer,
            audience = %config.jwt.audience,
            keys = ?self.state.store().list_ids(),
            "starting jwks-mock server"
        );

        let base = format!("http://{address}");
        for (method, path) in [
            ("GET", JWKS_PATH),
            ("POST", "/generate-token"),
            ("POST", "/generate-invalid-token"),
            ("POST", "/introspect"),
            ("GET", "/keys"),
            ("POST", "/keys"),
            ("DELETE", "/keys/{kid}"),
            ("GET", "/health"),
        ] {
            tracing::info!("  {method:<6} {base}{path}");
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwks_mock_keys::KeyStore;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let store = Arc::new(KeyStore::with_keys(["k1"]).unwrap());
        let server = JwksServer::from_state(AppState::with_store(AppConfig::default(), store));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = rx.await;
        }));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("jwt-dev-service"));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = taken.local_addr().unwrap().port();

        let store = Arc::new(KeyStore::with_keys(["k1"]).unwrap());
        let server = JwksServer::from_state(AppState::with_store(config, store));
        assert!(matches!(server.run().await, Err(ServerError::Bind { .. })));
    }
}
