//! Request handlers.

use crate::api_types::{
    AddKeyRequest, HealthResponse, KeyListResponse, KeyMutationResponse, KeySummary,
    SERVICE_NAME, TokenRequest, TokenResponse,
};
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use jwks_mock_keys::{IntrospectionResponse, IssuedToken, JwkSet};
use serde::de::DeserializeOwned;

/// `Cache-Control` value for the JWKS document.
pub const JWKS_CACHE_CONTROL: &str = "public, max-age=3600";

/// Parse a JSON body. An empty body yields the default value.
fn parse_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting request body");
        ApiError::InvalidJson
    })
}

/// Run CPU-heavy key work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.into()))
}

// -----------------------------------------------------------------------------
// Discovery
// -----------------------------------------------------------------------------

pub async fn jwks(State(state): State<AppState>) -> impl IntoResponse {
    let document: JwkSet = state.store().discovery_document();
    ([(header::CACHE_CONTROL, JWKS_CACHE_CONTROL)], Json(document))
}

// -----------------------------------------------------------------------------
// Tokens
// -----------------------------------------------------------------------------

pub async fn generate_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let request: TokenRequest = parse_json(&body)?;
    let issued = state
        .issuer()
        .issue(request.claims.unwrap_or_default(), request.expires_in)?;
    Ok(Json(token_response(issued)))
}

pub async fn generate_invalid_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let request: TokenRequest = parse_json(&body)?;
    let issued = blocking(move || {
        state
            .issuer()
            .issue_invalid(request.claims.unwrap_or_default(), request.expires_in)
    })
    .await??;
    Ok(Json(token_response(issued)))
}

fn token_response(issued: IssuedToken) -> TokenResponse {
    TokenResponse {
        token: issued.token,
        expires_in: issued.expires_in,
        key_id: issued.key_id,
        raw_request: issued.claims,
    }
}

/// Form-encoded `token=<jwt>`. Always answers 200.
pub async fn introspect(State(state): State<AppState>, body: Bytes) -> Json<IntrospectionResponse> {
    let token = url::form_urlencoded::parse(&body)
        .find(|(name, _)| name == "token")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    Json(state.introspector().introspect(&token))
}

// -----------------------------------------------------------------------------
// Key management
// -----------------------------------------------------------------------------

pub async fn list_keys(State(state): State<AppState>) -> Json<KeyListResponse> {
    let available_keys: Vec<KeySummary> = state
        .store()
        .list_ids()
        .into_iter()
        .map(KeySummary::new)
        .collect();

    Json(KeyListResponse {
        total_keys: available_keys.len(),
        available_keys,
    })
}

pub async fn add_key(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<KeyMutationResponse>), ApiError> {
    let request: AddKeyRequest = parse_json(&body)?;
    let kid = request
        .kid
        .filter(|kid| !kid.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("kid is required".to_string()))?;

    let store = state.store().clone();
    let added = {
        let kid = kid.clone();
        blocking(move || store.add(&kid)).await?
    };
    added.map_err(|source| ApiError::KeyMutation {
        kid: kid.clone(),
        source,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(KeyMutationResponse {
            success: true,
            message: format!("Key {kid} added successfully"),
            kid,
        }),
    ))
}

pub async fn remove_key(
    State(state): State<AppState>,
    Path(kid): Path<String>,
) -> Result<Json<KeyMutationResponse>, ApiError> {
    state
        .store()
        .remove(&kid)
        .map_err(|source| ApiError::KeyMutation {
            kid: kid.clone(),
            source,
        })?;

    Ok(Json(KeyMutationResponse {
        success: true,
        message: format!("Key {kid} removed successfully"),
        kid,
    }))
}

// -----------------------------------------------------------------------------
// Health
// -----------------------------------------------------------------------------

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        available_keys: state.store().list_ids(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_empty_body_is_default() {
        let request: TokenRequest = parse_json(b"").unwrap();
        assert!(request.claims.is_none());
        assert!(request.expires_in.is_none());

        let request: TokenRequest = parse_json(b"  \n").unwrap();
        assert!(request.claims.is_none());
    }

    #[test]
    fn test_parse_json_rejects_malformed() {
        assert!(matches!(
            parse_json::<TokenRequest>(b"{not json"),
            Err(ApiError::InvalidJson)
        ));
        assert!(matches!(
            parse_json::<TokenRequest>(br#"{"claims": "nope"}"#),
            Err(ApiError::InvalidJson)
        ));
    }

    #[test]
    fn test_parse_json_expires_in() {
        let request: TokenRequest =
            parse_json(br#"{"claims": {"sub": "a"}, "expiresIn": 60}"#).unwrap();
        assert_eq!(request.expires_in, Some(60));
        assert_eq!(request.claims.unwrap()["sub"], "a");
    }
}
