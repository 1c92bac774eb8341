//! Token issuance.

use crate::claims::{self, ClaimSet};
use crate::error::KeysError;
use crate::keys::KeyPair;
use crate::store::KeyStore;
use chrono::Utc;
use jwks_mock_core::JwtConfig;
use std::sync::Arc;

/// Lifetime applied when a request does not specify one.
pub const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Result of a token issuance.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed JWT.
    pub token: String,
    /// The `kid` declared in the token header.
    pub key_id: String,
    /// Lifetime used to compute `exp`, in seconds.
    pub expires_in: i64,
    /// Caller claims after default substitution, before system claims were added.
    pub claims: ClaimSet,
}

/// Signs tokens with keys drawn from a shared [`KeyStore`].
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    store: Arc<KeyStore>,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    /// Create an issuer stamping `iss` and the default `aud` into every token.
    pub fn new(store: Arc<KeyStore>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            store,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Create an issuer from the `jwt` configuration section.
    pub fn from_config(store: Arc<KeyStore>, config: &JwtConfig) -> Self {
        Self::new(store, &config.issuer, &config.audience)
    }

    /// The configured `iss` value.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The configured default `aud` value.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Issue a token signed by a randomly selected key from the store.
    ///
    /// An empty claim set is replaced by [`claims::default_claims`]. Lifetimes are
    /// not validated: zero or negative values produce already-expired tokens.
    pub fn issue(
        &self,
        claims: ClaimSet,
        lifetime_secs: Option<i64>,
    ) -> Result<IssuedToken, KeysError> {
        let claims = with_defaults(claims, claims::default_claims);
        let expires_in = lifetime_secs.unwrap_or(DEFAULT_LIFETIME_SECS);
        let key = self.signing_key()?;

        let token = key.sign(&self.payload(&claims, expires_in))?;
        tracing::debug!(kid = %key.kid(), expires_in, "issued token");

        Ok(IssuedToken {
            token,
            key_id: key.kid().to_string(),
            expires_in,
            claims,
        })
    }

    /// Issue a token that will fail verification.
    ///
    /// The header declares the `kid` of a real key from the store, but the
    /// signature comes from a throwaway key pair that is dropped before returning
    /// and never enters the store.
    pub fn issue_invalid(
        &self,
        claims: ClaimSet,
        lifetime_secs: Option<i64>,
    ) -> Result<IssuedToken, KeysError> {
        let claims = with_defaults(claims, claims::default_invalid_claims);
        let expires_in = lifetime_secs.unwrap_or(DEFAULT_LIFETIME_SECS);
        let real_key = self.signing_key()?;

        let forged = KeyPair::generate(real_key.kid())?;
        let token = forged.sign(&self.payload(&claims, expires_in))?;
        tracing::debug!(kid = %real_key.kid(), expires_in, "issued invalid token");

        Ok(IssuedToken {
            token,
            key_id: real_key.kid().to_string(),
            expires_in,
            claims,
        })
    }

    fn signing_key(&self) -> Result<Arc<KeyPair>, KeysError> {
        self.store.random().map_err(|e| {
            tracing::error!(error = %e, "no signing key available");
            KeysError::SigningKeyUnavailable
        })
    }

    fn payload(&self, claims: &ClaimSet, expires_in: i64) -> ClaimSet {
        claims::merge_system_claims(
            claims,
            &self.issuer,
            &self.audience,
            Utc::now().timestamp(),
            expires_in,
        )
    }
}

fn with_defaults(claims: ClaimSet, defaults: fn() -> ClaimSet) -> ClaimSet {
    if claims.is_empty() { defaults() } else { claims }
}
