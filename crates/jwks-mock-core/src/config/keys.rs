//! Signing keys generated at startup.

use serde::{Deserialize, Serialize};

/// Initial key set configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InitialKeysConfig {
    /// Number of keys. Only consulted by the `KEY_COUNT` override.
    pub count: usize,

    /// Key IDs, in the order they appear in the JWKS.
    pub key_ids: Vec<String>,
}

impl InitialKeysConfig {
    /// Replace the key list with `key-1..key-N`.
    pub fn generate_ids(&mut self, count: usize) {
        self.count = count;
        self.key_ids = (1..=count).map(|i| format!("key-{i}")).collect();
    }
}

impl Default for InitialKeysConfig {
    fn default() -> Self {
        Self {
            count: 2,
            key_ids: vec!["key-1".to_string(), "key-2".to_string()],
        }
    }
}
