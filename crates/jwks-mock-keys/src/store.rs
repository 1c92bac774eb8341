//! The shared, concurrently accessed set of signing keys.

use crate::error::KeysError;
use crate::keys::{JwkSet, KeyPair};
use rand::Rng;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Insertion-ordered collection of signing key pairs.
///
/// A single reader/writer lock guards the collection. RSA generation runs before
/// the write lock is taken, so writers only hold it for a scan and an append or
/// removal. Key pairs are handed out as [`Arc`] handles: a caller that already
/// selected a key can keep signing with it after the key is removed.
///
/// Once the store holds at least one key, [`remove`](Self::remove) refuses to take
/// it back to zero.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: RwLock<Vec<Arc<KeyPair>>>,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one freshly generated key per ID.
    pub fn with_keys<I, S>(ids: I) -> Result<Self, KeysError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        store.initialize(ids)?;
        Ok(store)
    }

    /// Replace the contents of the store with one new key per ID, in order.
    ///
    /// Duplicate IDs are rejected and leave the store untouched.
    pub fn initialize<I, S>(&self, ids: I) -> Result<(), KeysError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pairs: Vec<Arc<KeyPair>> = Vec::new();
        for kid in ids {
            let kid = kid.into();
            if pairs.iter().any(|p| p.kid() == kid) {
                return Err(KeysError::DuplicateKeyId(kid));
            }
            pairs.push(Arc::new(KeyPair::generate(kid)?));
        }

        let kids: Vec<&str> = pairs.iter().map(|p| p.kid()).collect();
        tracing::info!(keys = ?kids, "key store initialized");

        *self.write() = pairs;
        Ok(())
    }

    /// Generate a key pair with the given ID and append it.
    pub fn add(&self, kid: &str) -> Result<Arc<KeyPair>, KeysError> {
        // Fail fast before paying for RSA generation; `insert` re-checks under the
        // write lock.
        if self.contains(kid) {
            return Err(KeysError::DuplicateKeyId(kid.to_string()));
        }
        self.insert(KeyPair::generate(kid)?)
    }

    /// Append an existing key pair.
    pub fn insert(&self, pair: KeyPair) -> Result<Arc<KeyPair>, KeysError> {
        let mut keys = self.write();
        if keys.iter().any(|k| k.kid() == pair.kid()) {
            return Err(KeysError::DuplicateKeyId(pair.kid().to_string()));
        }

        let pair = Arc::new(pair);
        keys.push(Arc::clone(&pair));
        tracing::info!(kid = %pair.kid(), total = keys.len(), "key added");
        Ok(pair)
    }

    /// Remove the key with the given ID.
    pub fn remove(&self, kid: &str) -> Result<Arc<KeyPair>, KeysError> {
        let mut keys = self.write();
        let index = keys
            .iter()
            .position(|k| k.kid() == kid)
            .ok_or_else(|| KeysError::KeyNotFound(kid.to_string()))?;

        if keys.len() <= 1 {
            return Err(KeysError::LastKeyProtected(kid.to_string()));
        }

        let removed = keys.remove(index);
        tracing::info!(kid = %kid, total = keys.len(), "key removed");
        Ok(removed)
    }

    /// Look up a key by ID.
    pub fn get(&self, kid: &str) -> Result<Arc<KeyPair>, KeysError> {
        self.read()
            .iter()
            .find(|k| k.kid() == kid)
            .cloned()
            .ok_or_else(|| KeysError::KeyNotFound(kid.to_string()))
    }

    /// Whether a key with this ID exists.
    pub fn contains(&self, kid: &str) -> bool {
        self.read().iter().any(|k| k.kid() == kid)
    }

    /// Pick a key uniformly at random.
    pub fn random(&self) -> Result<Arc<KeyPair>, KeysError> {
        let keys = self.read();
        if keys.is_empty() {
            return Err(KeysError::NoKeysAvailable);
        }
        // ThreadRng is a CSPRNG reseeded from the OS.
        let index = rand::rng().random_range(0..keys.len());
        Ok(Arc::clone(&keys[index]))
    }

    /// All key IDs in insertion order.
    pub fn list_ids(&self) -> Vec<String> {
        self.read().iter().map(|k| k.kid().to_string()).collect()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Public keys as a JWKS, in insertion order.
    pub fn discovery_document(&self) -> JwkSet {
        JwkSet {
            keys: self.read().iter().map(|k| k.to_jwk()).collect(),
        }
    }

    // A panic while holding the lock cannot leave the Vec half-modified: every
    // mutation is a single push/remove/assignment.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<KeyPair>>> {
        self.keys.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<KeyPair>>> {
        self.keys.write().unwrap_or_else(PoisonError::into_inner)
    }
}
