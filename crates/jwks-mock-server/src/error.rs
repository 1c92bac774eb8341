//! Error types for the HTTP layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jwks_mock_keys::KeysError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is not valid JSON for the endpoint.
    #[error("Invalid JSON request")]
    InvalidJson,

    /// The request is well-formed JSON but missing required input.
    #[error("{0}")]
    InvalidRequest(String),

    /// Adding or removing a key failed.
    #[error("{source}")]
    KeyMutation {
        kid: String,
        #[source]
        source: KeysError,
    },

    /// Token issuance failed.
    #[error(transparent)]
    Keys(#[from] KeysError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::KeyMutation { source, .. } | ApiError::Keys(source) => keys_status(source),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn keys_status(err: &KeysError) -> StatusCode {
    match err {
        KeysError::DuplicateKeyId(_) => StatusCode::CONFLICT,
        KeysError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        KeysError::LastKeyProtected(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = match &self {
            ApiError::KeyMutation { kid, source } => json!({
                "success": false,
                "message": source.to_string(),
                "kid": kid,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Initial key generation failed.
    #[error("failed to initialize keys: {0}")]
    KeyInitialization(#[from] KeysError),

    /// The listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let mutation = |source| ApiError::KeyMutation {
            kid: "k1".to_string(),
            source,
        };

        assert_eq!(
            mutation(KeysError::DuplicateKeyId("k1".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            mutation(KeysError::KeyNotFound("k1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            mutation(KeysError::LastKeyProtected("k1".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Keys(KeysError::SigningKeyUnavailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_json_message() {
        assert_eq!(ApiError::InvalidJson.to_string(), "Invalid JSON request");
    }
}
