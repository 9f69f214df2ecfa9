// crates/keychain-store/src/backend.rs
// ============================================================================
// Module: Keychain Storage Backend
// Description: Key/value backend trait and the in-memory implementation.
// Purpose: Abstract the persistence substrate behind a minimal surface.
// Dependencies: keychain-core, serde_json
// ============================================================================

//! ## Overview
//! The storage backend is a flat string-keyed map of JSON values, the shape
//! an embedded host storage exposes. The in-memory backend is deterministic
//! and suitable for tests and single-process embedding; hosts with durable
//! storage implement [`StorageBackend`] over their own substrate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use keychain_core::StoreError;
use serde_json::Value;

// ============================================================================
// SECTION: Storage Backend
// ============================================================================

/// Flat key/value storage substrate.
pub trait StorageBackend: Send + Sync {
    /// Stores a value under a key, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Loads the value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Removes the value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the removal fails.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Lists every stored key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing fails.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Removes every stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the clear fails.
    fn clear(&self) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: In-Memory Backend
// ============================================================================

/// In-memory storage backend for embedded use and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    /// Entry map protected by a mutex.
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl InMemoryBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl StorageBackend for InMemoryBackend {
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Io("storage mutex poisoned".to_string()))?
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("storage mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Io("storage mutex poisoned".to_string()))?
            .remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StoreError::Io("storage mutex poisoned".to_string()))?;
        Ok(guard.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Io("storage mutex poisoned".to_string()))?
            .clear();
        Ok(())
    }
}
