//! Request and response bodies for the JSON API.

use jwks_mock_keys::ClaimSet;
use jwks_mock_keys::keys::{ALGORITHM_NAME, KEY_USE};
use serde::{Deserialize, Serialize};

/// Value of the `service` field in health responses.
pub const SERVICE_NAME: &str = "jwt-dev-service";

// =============================================================================
// Tokens
// =============================================================================

/// Body of `/generate-token` and `/generate-invalid-token`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub claims: Option<ClaimSet>,

    /// Token lifetime in seconds.
    #[serde(default, rename = "expiresIn")]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub key_id: String,
    /// The claims the token was built from, before system claims were added.
    pub raw_request: ClaimSet,
}

// =============================================================================
// Keys
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddKeyRequest {
    #[serde(default)]
    pub kid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMutationResponse {
    pub success: bool,
    pub message: String,
    pub kid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySummary {
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub key_use: String,
}

impl KeySummary {
    pub fn new(kid: String) -> Self {
        Self {
            kid,
            alg: ALGORITHM_NAME.to_string(),
            key_use: KEY_USE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyListResponse {
    pub total_keys: usize,
    pub available_keys: Vec<KeySummary>,
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub available_keys: Vec<String>,
}
