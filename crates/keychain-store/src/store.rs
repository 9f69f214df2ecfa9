// crates/keychain-store/src/store.rs
// ============================================================================
// Module: Keychain Controller Store
// Description: Session and controller record persistence over a backend.
// Purpose: Implement the core store interfaces with versioned keys.
// Dependencies: keychain-core, serde_json, crate::{backend, selectors}
// ============================================================================

//! ## Overview
//! [`ControllerStore`] implements [`SessionStore`] and [`ControllerRegistry`]
//! over any [`StorageBackend`]. Session `create` replaces the whole record
//! for its composite key; re-approval never merges grants. Stored values
//! that fail to decode surface as [`StoreError::Corrupt`] rather than being
//! silently dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use keychain_core::AdminRecord;
use keychain_core::ChainId;
use keychain_core::ContractAddress;
use keychain_core::ControllerRecord;
use keychain_core::ControllerRegistry;
use keychain_core::DeploymentRecord;
use keychain_core::Origin;
use keychain_core::Session;
use keychain_core::SessionStore;
use keychain_core::StoreError;
use serde_json::Value;

use crate::backend::StorageBackend;
use crate::selectors;

// ============================================================================
// SECTION: Controller Store
// ============================================================================

/// Persistence for sessions and controller bookkeeping records.
#[derive(Debug, Clone)]
pub struct ControllerStore<K> {
    /// Storage backend holding the versioned records.
    backend: K,
}

impl<K: StorageBackend> ControllerStore<K> {
    /// Creates a store over a backend.
    #[must_use]
    pub const fn new(backend: K) -> Self {
        Self {
            backend,
        }
    }

    /// Returns a reference to the underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &K {
        &self.backend
    }

    /// Decodes a stored JSON value into a record.
    fn decode<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<T, StoreError> {
        serde_json::from_value(value)
            .map_err(|err| StoreError::Corrupt(format!("record at {key} failed to decode: {err}")))
    }

    /// Encodes a record into a stored JSON value.
    fn encode<T: serde::Serialize>(record: &T) -> Result<Value, StoreError> {
        serde_json::to_value(record)
            .map_err(|err| StoreError::Operation(format!("record failed to encode: {err}")))
    }
}

impl<K: StorageBackend> SessionStore for ControllerStore<K> {
    fn create(&self, session: &Session) -> Result<(), StoreError> {
        let key = selectors::session(&session.account_address, &session.origin, &session.chain_id);
        self.backend.set(&key, &Self::encode(session)?)
    }

    fn get(
        &self,
        address: &ContractAddress,
        origin: &Origin,
        chain_id: &ChainId,
    ) -> Result<Option<Session>, StoreError> {
        let key = selectors::session(address, origin, chain_id);
        self.backend.get(&key)?.map(|value| Self::decode(&key, value)).transpose()
    }

    fn revoke(
        &self,
        address: &ContractAddress,
        origin: &Origin,
        chain_id: &ChainId,
    ) -> Result<(), StoreError> {
        self.backend.remove(&selectors::session(address, origin, chain_id))
    }

    fn list_all(&self, address: &ContractAddress) -> Result<Vec<Session>, StoreError> {
        let prefix = selectors::session_prefix(address);
        let mut sessions = Vec::new();
        for key in self.backend.keys()? {
            if !key.starts_with(&prefix) {
                continue;
            }
            if let Some(value) = self.backend.get(&key)? {
                sessions.push(Self::decode(&key, value)?);
            }
        }
        Ok(sessions)
    }
}

impl<K: StorageBackend> ControllerRegistry for ControllerStore<K> {
    fn set_active(&self, record: &ControllerRecord) -> Result<(), StoreError> {
        self.backend.set(&selectors::account(&record.address), &Self::encode(record)?)?;
        self.backend
            .set(&selectors::active(), &Value::String(record.address.as_str().to_string()))
    }

    fn active(&self) -> Result<Option<ControllerRecord>, StoreError> {
        let Some(pointer) = self.backend.get(&selectors::active())? else {
            return Ok(None);
        };
        let Value::String(address) = pointer else {
            return Err(StoreError::Corrupt("active pointer is not a string".to_string()));
        };
        let key = selectors::account(&ContractAddress::new(address));
        self.backend.get(&key)?.map(|value| Self::decode(&key, value)).transpose()
    }

    fn clear_active(&self) -> Result<(), StoreError> {
        self.backend.remove(&selectors::active())
    }

    fn put_deployment(&self, record: &DeploymentRecord) -> Result<(), StoreError> {
        let key = selectors::deployment(&record.address, &record.chain_id);
        self.backend.set(&key, &Self::encode(record)?)
    }

    fn deployment(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
    ) -> Result<Option<DeploymentRecord>, StoreError> {
        let key = selectors::deployment(address, chain_id);
        self.backend.get(&key)?.map(|value| Self::decode(&key, value)).transpose()
    }

    fn put_admin(&self, record: &AdminRecord) -> Result<(), StoreError> {
        let key = selectors::admin(&record.address, &record.origin);
        self.backend.set(&key, &Self::encode(record)?)
    }

    fn admin(
        &self,
        address: &ContractAddress,
        origin: &Origin,
    ) -> Result<Option<AdminRecord>, StoreError> {
        let key = selectors::admin(address, origin);
        self.backend.get(&key)?.map(|value| Self::decode(&key, value)).transpose()
    }
}
