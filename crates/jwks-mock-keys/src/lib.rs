//! # jwks-mock-keys
//!
//! Key store and token lifecycle engine for the jwks-mock development service.
//!
//! This crate provides functionality for:
//! - Generating RSA-2048 key pairs and keeping them in a concurrent [`KeyStore`]
//! - Publishing the public halves as a JSON Web Key Set
//! - Issuing RS256 tokens with caller-supplied claims ([`TokenIssuer`])
//! - Issuing deliberately forged tokens for negative-path testing
//! - RFC 7662 style token introspection ([`Introspector`])
//!
//! ## Token Flow
//!
//! | Step | Component | Notes |
//! |------|-----------|-------|
//! | Pick a key | [`KeyStore::random`] | Uniform, CSPRNG-backed |
//! | Merge claims | [`claims::merge_system_claims`] | `iat`/`exp`/`iss` always win, caller `aud` wins |
//! | Sign | [`KeyPair::sign`] | `kid` header matches a JWKS entry |
//! | Verify | [`Introspector::introspect`] | Any failure reports `{"active": false}` |
//!
//! ## Example
//!
//! ```no_run
//! use jwks_mock_keys::{ClaimSet, Introspector, KeyStore, TokenIssuer};
//! use std::sync::Arc;
//!
//! let store = Arc::new(KeyStore::with_keys(["key-1", "key-2"])?);
//! let issuer = TokenIssuer::new(store.clone(), "http://localhost:3000", "dev-api");
//! let introspector = Introspector::new(store, "http://localhost:3000", "dev-api");
//!
//! let mut claims = ClaimSet::new();
//! claims.insert("sub".into(), "alice".into());
//! let issued = issuer.issue(claims, None)?;
//!
//! assert!(introspector.introspect(&issued.token).active);
//! # Ok::<(), jwks_mock_keys::KeysError>(())
//! ```

pub mod claims;
pub mod error;
pub mod introspect;
pub mod keys;
pub mod store;
pub mod token;

pub use claims::ClaimSet;
pub use error::KeysError;
pub use introspect::{IntrospectionResponse, Introspector};
pub use keys::{Jwk, JwkSet, KeyPair};
pub use store::KeyStore;
pub use token::{IssuedToken, TokenIssuer};
