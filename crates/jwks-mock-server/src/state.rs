//! Shared application state.

use jwks_mock_core::AppConfig;
use jwks_mock_keys::{Introspector, KeyStore, KeysError, TokenIssuer};
use std::sync::Arc;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<KeyStore>,
    issuer: TokenIssuer,
    introspector: Introspector,
}

impl AppState {
    /// Create state, generating the configured initial keys.
    pub fn new(config: AppConfig) -> Result<Self, KeysError> {
        let store = KeyStore::with_keys(config.initial_keys.key_ids.iter().cloned())?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create state around an existing key store.
    pub fn with_store(config: AppConfig, store: Arc<KeyStore>) -> Self {
        let issuer = TokenIssuer::from_config(store.clone(), &config.jwt);
        let introspector = Introspector::from_config(store.clone(), &config.jwt);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                issuer,
                introspector,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.inner.store
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.inner.issuer
    }

    pub fn introspector(&self) -> &Introspector {
        &self.inner.introspector
    }
}
