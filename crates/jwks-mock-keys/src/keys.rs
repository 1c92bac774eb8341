//! RSA key pairs and their JWK representation.

use crate::claims::ClaimSet;
use crate::error::KeysError;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only signing algorithm this service issues and accepts.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// JWK `alg` value for [`ALGORITHM`].
pub const ALGORITHM_NAME: &str = "RS256";

/// JWK `use` value for signing keys.
pub const KEY_USE: &str = "sig";

/// JWK `kty` value for RSA keys.
pub const KEY_TYPE: &str = "RSA";

/// RSA modulus size for generated keys.
pub const MODULUS_BITS: usize = 2048;

/// An RSA key pair used to sign tokens, identified by a caller-chosen key ID.
///
/// Key pairs are immutable once created. The public key, the jsonwebtoken
/// encoding/decoding keys and the JWK components are all derived from the private
/// key at construction time.
pub struct KeyPair {
    kid: String,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Base64url-encoded modulus.
    n: String,
    /// Base64url-encoded public exponent.
    e: String,
}

impl KeyPair {
    /// Generate a fresh RSA-2048 key pair.
    pub fn generate(kid: impl Into<String>) -> Result<Self, KeysError> {
        let kid = kid.into();
        let private_key = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS).map_err(|e| {
            KeysError::KeyGenerationFailed {
                kid: kid.clone(),
                reason: e.to_string(),
            }
        })?;
        Self::from_private_key(kid, private_key)
    }

    /// Wrap an existing RSA private key.
    pub fn from_private_key(
        kid: impl Into<String>,
        private_key: RsaPrivateKey,
    ) -> Result<Self, KeysError> {
        let kid = kid.into();
        let key_error = |reason: String| KeysError::KeyGenerationFailed {
            kid: kid.clone(),
            reason,
        };

        let public_key = private_key.to_public_key();
        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        let der = private_key
            .to_pkcs1_der()
            .map_err(|e| key_error(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());
        let decoding_key =
            DecodingKey::from_rsa_components(&n, &e).map_err(|e| key_error(e.to_string()))?;

        Ok(Self {
            kid,
            private_key,
            public_key,
            encoding_key,
            decoding_key,
            n,
            e,
        })
    }

    /// The key ID, as published in the JWKS and in token headers.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// The RSA public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Whether `public_key` is the public half of the private key.
    pub fn is_consistent(&self) -> bool {
        self.private_key.to_public_key() == self.public_key
    }

    /// Key used to verify signatures made by this pair.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Sign `claims` as an RS256 JWT whose header carries this pair's key ID.
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, KeysError> {
        let mut header = Header::new(ALGORITHM);
        header.kid = Some(self.kid.clone());

        jsonwebtoken::encode(&header, claims, &self.encoding_key)
            .map_err(|e| KeysError::SigningFailed(e.to_string()))
    }

    /// Public JWK for this pair. Never includes private material.
    pub fn to_jwk(&self) -> Jwk {
        Jwk {
            kty: KEY_TYPE.to_string(),
            key_use: KEY_USE.to_string(),
            kid: self.kid.clone(),
            alg: ALGORITHM_NAME.to_string(),
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

/// A public RSA key in JSON Web Key form (RFC 7517).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub kid: String,
    pub alg: String,
    /// Base64url-encoded modulus.
    pub n: String,
    /// Base64url-encoded public exponent.
    pub e: String,
}

/// A JSON Web Key Set, as served from `/.well-known/jwks.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find a key by ID.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Validation;

    #[test]
    fn test_keypair_generation() {
        let pair = KeyPair::generate("k1").unwrap();
        assert_eq!(pair.kid(), "k1");
        assert!(pair.is_consistent());
        assert_eq!(pair.public_key().size() * 8, MODULUS_BITS);
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let pair = KeyPair::generate("k1").unwrap();
        let mut claims = ClaimSet::new();
        claims.insert("sub".into(), "alice".into());
        claims.insert("exp".into(), (chrono::Utc::now().timestamp() + 60).into());

        let token = pair.sign(&claims).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("k1"));

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_aud = false;
        let decoded = jsonwebtoken::decode::<ClaimSet>(&token, pair.decoding_key(), &validation)
            .unwrap();
        assert_eq!(decoded.claims["sub"], "alice");
    }

    #[test]
    fn test_foreign_key_does_not_verify() {
        let signer = KeyPair::generate("k1").unwrap();
        let other = KeyPair::generate("k1").unwrap();
        let mut claims = ClaimSet::new();
        claims.insert("exp".into(), (chrono::Utc::now().timestamp() + 60).into());

        let token = signer.sign(&claims).unwrap();
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_aud = false;
        assert!(
            jsonwebtoken::decode::<ClaimSet>(&token, other.decoding_key(), &validation).is_err()
        );
    }

    #[test]
    fn test_jwk_fields() {
        let pair = KeyPair::generate("k1").unwrap();
        let jwk = serde_json::to_value(pair.to_jwk()).unwrap();

        assert_eq!(jwk["kty"], "RSA");
        assert_eq!(jwk["use"], "sig");
        assert_eq!(jwk["alg"], "RS256");
        assert_eq!(jwk["kid"], "k1");
        // 65537
        assert_eq!(jwk["e"], "AQAB");
        assert!(jwk.get("d").is_none());

        let n = URL_SAFE_NO_PAD.decode(jwk["n"].as_str().unwrap()).unwrap();
        assert_eq!(n.len() * 8, MODULUS_BITS);
    }

    #[test]
    fn test_debug_hides_private_key() {
        let pair = KeyPair::generate("k1").unwrap();
        let debug = format!("{pair:?}");
        assert!(debug.contains("k1"));
        assert!(!debug.contains("private_key"));
    }
}
