//! RFC 7662 token introspection.
//!
//! Every verification failure collapses to `{"active": false}`. The reason is
//! logged at debug level and never returned to the caller.

use crate::claims::{ClaimSet, names};
use crate::keys::ALGORITHM;
use crate::store::KeyStore;
use jsonwebtoken::Validation;
use jwks_mock_core::JwtConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Token type reported for active tokens.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Result fields that passthrough claims may never overwrite.
const RESERVED_FIELDS: &[&str] = &[
    "active",
    "token_type",
    "scope",
    "client_id",
    "username",
    names::EXPIRES_AT,
    names::ISSUED_AT,
    names::NOT_BEFORE,
    names::SUBJECT,
    names::AUDIENCE,
    names::ISSUER,
    names::TOKEN_ID,
];

/// Introspection result in RFC 7662 shape.
///
/// Inactive results serialize to exactly `{"active": false}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectionResponse {
    pub active: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Copied from `sub`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Every other claim from the token payload.
    #[serde(flatten)]
    pub extra: ClaimSet,
}

impl IntrospectionResponse {
    /// The `{"active": false}` result.
    pub fn inactive() -> Self {
        Self::default()
    }

    fn from_claims(mut claims: ClaimSet) -> Self {
        let mut take_string = |name: &str| match claims.remove(name) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let sub = take_string(names::SUBJECT);
        let aud = take_string(names::AUDIENCE);
        let iss = take_string(names::ISSUER);
        let jti = take_string(names::TOKEN_ID);
        let scope = take_string("scope");
        let client_id = take_string("client_id");

        let mut take_number = |name: &str| claims.remove(name).and_then(|v| v.as_i64());
        let exp = take_number(names::EXPIRES_AT);
        let iat = take_number(names::ISSUED_AT);
        let nbf = take_number(names::NOT_BEFORE);

        claims.retain(|name, _| !RESERVED_FIELDS.contains(&name.as_str()));

        Self {
            active: true,
            token_type: Some(TOKEN_TYPE_BEARER.to_string()),
            scope,
            client_id,
            username: sub.clone(),
            exp,
            iat,
            nbf,
            sub,
            aud,
            iss,
            jti,
            extra: claims,
        }
    }
}

#[derive(Debug, Error)]
enum Rejection {
    #[error("malformed token header: {0}")]
    MalformedHeader(jsonwebtoken::errors::Error),

    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),

    #[error("token header has no kid")]
    MissingKeyId,

    #[error("unknown key {0}")]
    UnknownKey(String),

    #[error("verification failed: {0}")]
    Verification(jsonwebtoken::errors::Error),

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("audience mismatch")]
    AudienceMismatch,
}

/// Decides whether tokens are currently valid against a shared [`KeyStore`].
#[derive(Debug, Clone)]
pub struct Introspector {
    store: Arc<KeyStore>,
    issuer: String,
    audience: String,
}

impl Introspector {
    pub fn new(store: Arc<KeyStore>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            store,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    pub fn from_config(store: Arc<KeyStore>, config: &JwtConfig) -> Self {
        Self::new(store, &config.issuer, &config.audience)
    }

    /// Introspect a token string. Never fails.
    pub fn introspect(&self, token: &str) -> IntrospectionResponse {
        if token.is_empty() {
            return IntrospectionResponse::inactive();
        }

        match self.verify(token) {
            Ok(claims) => IntrospectionResponse::from_claims(claims),
            Err(reason) => {
                tracing::debug!(%reason, "token rejected");
                IntrospectionResponse::inactive()
            }
        }
    }

    fn verify(&self, token: &str) -> Result<ClaimSet, Rejection> {
        let header = jsonwebtoken::decode_header(token).map_err(Rejection::MalformedHeader)?;
        if header.alg != ALGORITHM {
            return Err(Rejection::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(Rejection::MissingKeyId)?;
        let key = self
            .store
            .get(&kid)
            .map_err(|_| Rejection::UnknownKey(kid))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // `aud` is compared below by exact string equality.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&[names::EXPIRES_AT]);

        let claims = jsonwebtoken::decode::<ClaimSet>(token, key.decoding_key(), &validation)
            .map_err(Rejection::Verification)?
            .claims;

        if claims.get(names::ISSUER).and_then(Value::as_str) != Some(self.issuer.as_str()) {
            return Err(Rejection::IssuerMismatch);
        }
        if claims.get(names::AUDIENCE).and_then(Value::as_str) != Some(self.audience.as_str()) {
            return Err(Rejection::AudienceMismatch);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenIssuer;
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const ISSUER: &str = "http://localhost:3000";
    const AUDIENCE: &str = "dev-api";

    fn setup(ids: &[&str]) -> (Arc<KeyStore>, TokenIssuer, Introspector) {
        let store = Arc::new(KeyStore::with_keys(ids.iter().copied()).unwrap());
        let issuer = TokenIssuer::new(store.clone(), ISSUER, AUDIENCE);
        let introspector = Introspector::new(store.clone(), ISSUER, AUDIENCE);
        (store, issuer, introspector)
    }

    fn claims(value: Value) -> ClaimSet {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_token_is_exactly_inactive() {
        let (_, _, introspector) = setup(&["k1"]);
        let result = introspector.introspect("");
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "active": false }));
    }

    #[test]
    fn test_valid_token() {
        let (_, issuer, introspector) = setup(&["k1", "k2"]);
        let issued = issuer
            .issue(
                claims(json!({
                    "sub": "alice",
                    "email": "alice@example.com",
                    "scope": "read write",
                    "jti": "abc",
                })),
                None,
            )
            .unwrap();

        let result = introspector.introspect(&issued.token);
        assert!(result.active);
        assert_eq!(result.token_type.as_deref(), Some("Bearer"));
        assert_eq!(result.sub.as_deref(), Some("alice"));
        assert_eq!(result.username.as_deref(), Some("alice"));
        assert_eq!(result.iss.as_deref(), Some(ISSUER));
        assert_eq!(result.aud.as_deref(), Some(AUDIENCE));
        assert_eq!(result.scope.as_deref(), Some("read write"));
        assert_eq!(result.jti.as_deref(), Some("abc"));
        assert_eq!(result.exp.unwrap() - result.iat.unwrap(), 3600);
        assert_eq!(result.extra["email"], "alice@example.com");
        assert!(!result.extra.contains_key("sub"));
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let (_, issuer, introspector) = setup(&["k1"]);
        let issued = issuer
            .issue(claims(json!({ "sub": "alice", "roles": ["admin"] })), None)
            .unwrap();

        let body = serde_json::to_value(introspector.introspect(&issued.token)).unwrap();
        assert_eq!(body["active"], true);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["roles"], json!(["admin"]));
        assert!(body.get("extra").is_none());
        assert!(body.get("nbf").is_none());
    }

    #[test]
    fn test_invalid_token_is_inactive() {
        let (_, issuer, introspector) = setup(&["k1"]);
        let issued = issuer
            .issue_invalid(claims(json!({ "sub": "bob" })), Some(1800))
            .unwrap();
        assert_eq!(introspector.introspect(&issued.token), IntrospectionResponse::inactive());
    }

    #[test]
    fn test_expired_token_is_inactive() {
        let (_, issuer, introspector) = setup(&["k1"]);
        let issued = issuer.issue(claims(json!({ "sub": "a" })), Some(-60)).unwrap();
        assert!(!introspector.introspect(&issued.token).active);
    }

    #[test]
    fn test_issuer_mismatch_is_inactive() {
        let (store, issuer, _) = setup(&["k1"]);
        let other = Introspector::new(store, "http://elsewhere", AUDIENCE);
        let issued = issuer.issue(claims(json!({ "sub": "a" })), None).unwrap();
        assert!(!other.introspect(&issued.token).active);
    }

    #[test]
    fn test_custom_audience_is_inactive() {
        let (_, issuer, introspector) = setup(&["k1"]);
        let issued = issuer
            .issue(claims(json!({ "sub": "carol", "aud": "custom-service" })), None)
            .unwrap();
        assert!(!introspector.introspect(&issued.token).active);
    }

    #[test]
    fn test_removed_key_is_inactive() {
        let (store, issuer, introspector) = setup(&["k1", "k2"]);
        let issued = issuer.issue(claims(json!({ "sub": "a" })), None).unwrap();
        assert!(introspector.introspect(&issued.token).active);

        store.remove(&issued.key_id).unwrap();
        assert!(!introspector.introspect(&issued.token).active);
    }

    #[test]
    fn test_garbage_is_inactive() {
        let (_, _, introspector) = setup(&["k1"]);
        for token in ["not-a-jwt", "a.b.c", "....", "eyJhbGciOiJSUzI1NiJ9.e30.sig"] {
            assert_eq!(introspector.introspect(token), IntrospectionResponse::inactive());
        }
    }

    #[test]
    fn test_hmac_token_with_known_kid_is_inactive() {
        let (_, _, introspector) = setup(&["k1"]);
        let mut header = Header::new(jsonwebtoken::Algorithm::HS256);
        header.kid = Some("k1".to_string());
        let payload = claims(json!({
            "sub": "mallory",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": Utc::now().timestamp() + 600,
        }));
        let token =
            jsonwebtoken::encode(&header, &payload, &EncodingKey::from_secret(b"secret")).unwrap();

        assert!(!introspector.introspect(&token).active);
    }

    #[test]
    fn test_token_without_exp_is_inactive() {
        let (store, _, introspector) = setup(&["k1"]);
        let key = store.get("k1").unwrap();
        let token = key
            .sign(&claims(json!({ "sub": "a", "iss": ISSUER, "aud": AUDIENCE })))
            .unwrap();
        assert!(!introspector.introspect(&token).active);
    }

    #[test]
    fn test_future_nbf_is_inactive() {
        let (store, _, introspector) = setup(&["k1"]);
        let now = Utc::now().timestamp();
        let key = store.get("k1").unwrap();
        let token = key
            .sign(&claims(json!({
                "iss": ISSUER,
                "aud": AUDIENCE,
                "exp": now + 600,
                "nbf": now + 300,
            })))
            .unwrap();
        assert!(!introspector.introspect(&token).active);
    }

    #[test]
    fn test_reserved_fields_are_not_overwritten() {
        let mut payload = claims(json!({
            "sub": "alice",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "exp": 100,
            "username": "impostor",
            "token_type": "mac",
            "active": false,
            "client_id": 42,
        }));
        payload.insert("custom".into(), json!({ "nested": true }));

        let result = IntrospectionResponse::from_claims(payload);
        assert!(result.active);
        assert_eq!(result.username.as_deref(), Some("alice"));
        assert_eq!(result.token_type.as_deref(), Some("Bearer"));
        assert!(result.client_id.is_none());
        assert_eq!(result.extra.len(), 1);
        assert_eq!(result.extra["custom"]["nested"], true);
    }
}
