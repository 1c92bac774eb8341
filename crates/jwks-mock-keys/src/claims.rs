//! Claim sets and the system-claim merge rules.

use serde_json::{Map, Value, json};

/// An open set of JWT claims: claim name to arbitrary JSON value.
pub type ClaimSet = Map<String, Value>;

/// Registered claim names (RFC 7519 §4.1).
pub mod names {
    pub const ISSUER: &str = "iss";
    pub const SUBJECT: &str = "sub";
    pub const AUDIENCE: &str = "aud";
    pub const EXPIRES_AT: &str = "exp";
    pub const NOT_BEFORE: &str = "nbf";
    pub const ISSUED_AT: &str = "iat";
    pub const TOKEN_ID: &str = "jti";
}

/// Claims used when a token request carries none.
pub fn default_claims() -> ClaimSet {
    demo_claims("test-user", "test@example.com", "Test User")
}

/// Claims used when an invalid-token request carries none.
pub fn default_invalid_claims() -> ClaimSet {
    demo_claims("invalid-test-user", "invalid-test@example.com", "Invalid Test User")
}

fn demo_claims(sub: &str, email: &str, name: &str) -> ClaimSet {
    let mut claims = ClaimSet::new();
    claims.insert(names::SUBJECT.to_string(), sub.into());
    claims.insert("email".to_string(), email.into());
    claims.insert("name".to_string(), name.into());
    claims.insert("roles".to_string(), json!(["user"]));
    claims
}

/// Build the signed payload from caller claims.
///
/// `iat`, `exp` and `iss` always overwrite caller values. `aud` is only set when
/// the caller did not provide one. Every other caller claim is kept as-is.
pub fn merge_system_claims(
    claims: &ClaimSet,
    issuer: &str,
    audience: &str,
    issued_at: i64,
    lifetime_secs: i64,
) -> ClaimSet {
    let mut payload = claims.clone();
    payload.insert(names::ISSUED_AT.to_string(), issued_at.into());
    payload.insert(
        names::EXPIRES_AT.to_string(),
        issued_at.saturating_add(lifetime_secs).into(),
    );
    payload.insert(names::ISSUER.to_string(), issuer.into());
    payload
        .entry(names::AUDIENCE)
        .or_insert_with(|| audience.into());
    payload
}
