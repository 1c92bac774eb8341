//! Issuer and audience stamped into issued tokens.

use serde::{Deserialize, Serialize};

/// Token claim configuration.
///
/// `issuer` is always written to the `iss` claim. `audience` is written to `aud`
/// unless the caller already supplied one. Introspection only reports tokens as
/// active when both match these values exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:3000".to_string(),
            audience: "dev-api".to_string(),
        }
    }
}
