// crates/keychain-core/src/interfaces/mod.rs
// ============================================================================
// Module: Keychain Interfaces
// Description: Backend-agnostic interfaces for execution and persistence.
// Purpose: Define the contract surfaces used by the Keychain runtime.
// Dependencies: crate::core, async-trait, serde, serde_json
// ============================================================================

//! ## Overview
//! Interfaces define how Keychain integrates with the external execution
//! environment and with persistent storage without embedding backend-specific
//! details. Implementations must fail closed on missing or invalid data; the
//! execution environment is always treated as the source of truth for live
//! account status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::AccountStatus;
use crate::core::AdminRecord;
use crate::core::Call;
use crate::core::ChainId;
use crate::core::ContractAddress;
use crate::core::ControllerRecord;
use crate::core::DeploymentRecord;
use crate::core::FeeAmount;
use crate::core::Origin;
use crate::core::Session;

// ============================================================================
// SECTION: Execution Backend
// ============================================================================

/// Fee estimate returned by the external estimator.
///
/// # Invariants
/// - `suggested_max_fee` is adopted verbatim when the caller supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimate {
    /// Suggested maximum fee for the batch.
    pub suggested_max_fee: FeeAmount,
}

/// Receipt returned by the external execute service.
///
/// # Invariants
/// - `transaction_hash` identifies the submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    /// Hash of the submitted transaction.
    pub transaction_hash: String,
}

/// Execution backend errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Fee estimation failed.
    #[error("fee estimation failed: {0}")]
    Estimation(String),
    /// Transaction submission failed.
    #[error("execution failed: {0}")]
    Execution(String),
    /// Device registration failed or was refused.
    #[error("registration failed: {0}")]
    Registration(String),
    /// Account status query failed.
    #[error("status query failed: {0}")]
    Status(String),
}

/// Opaque external execution environment.
///
/// Estimates fees, submits transaction batches, registers device
/// credentials, and reports live account deployment status.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Queries the live deployment status for an account on a chain.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the status query fails.
    async fn account_status(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
    ) -> Result<AccountStatus, BackendError>;

    /// Estimates the fee for an invoke transaction batch.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when estimation fails.
    async fn estimate_invoke_fee(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
        calls: &[Call],
    ) -> Result<FeeEstimate, BackendError>;

    /// Estimates the fee for a declare transaction payload.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when estimation fails.
    async fn estimate_declare_fee(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
        payload: &Value,
    ) -> Result<FeeEstimate, BackendError>;

    /// Signs and submits a transaction batch under a fee limit.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when submission fails.
    async fn execute(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
        calls: &[Call],
        max_fee: FeeAmount,
    ) -> Result<ExecutionReceipt, BackendError>;

    /// Registers this device's credential as a signer for the account.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when registration fails or is refused.
    async fn register(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
    ) -> Result<(), BackendError>;
}

// ============================================================================
// SECTION: Session Store
// ============================================================================

/// Session store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Stored record is corrupted or fails to decode.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Storage operation failed.
    #[error("store operation failed: {0}")]
    Operation(String),
}

/// Keyed persistence for session grants.
///
/// Sessions are owned exclusively by the store; `create` replaces any
/// existing grant for the same `(account, origin, chain)` key whole.
pub trait SessionStore {
    /// Creates or replaces the session for its composite key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Loads the session for an `(account, origin, chain)` key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(
        &self,
        address: &ContractAddress,
        origin: &Origin,
        chain_id: &ChainId,
    ) -> Result<Option<Session>, StoreError>;

    /// Revokes the session for an `(account, origin, chain)` key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when removal fails.
    fn revoke(
        &self,
        address: &ContractAddress,
        origin: &Origin,
        chain_id: &ChainId,
    ) -> Result<(), StoreError>;

    /// Lists all sessions stored for an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list_all(&self, address: &ContractAddress) -> Result<Vec<Session>, StoreError>;
}

// ============================================================================
// SECTION: Controller Registry
// ============================================================================

/// Keyed persistence for controller bookkeeping records.
///
/// Holds the active-controller pointer plus per-address account records,
/// per-(address, chain) deployment records, and per-(address, origin) admin
/// records.
pub trait ControllerRegistry {
    /// Records a controller and marks it active.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn set_active(&self, record: &ControllerRecord) -> Result<(), StoreError>;

    /// Loads the active controller, if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn active(&self) -> Result<Option<ControllerRecord>, StoreError>;

    /// Clears the active-controller pointer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when removal fails.
    fn clear_active(&self) -> Result<(), StoreError>;

    /// Records the last observed deployment status for an account on a chain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn put_deployment(&self, record: &DeploymentRecord) -> Result<(), StoreError>;

    /// Loads the deployment record for an `(address, chain)` key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn deployment(
        &self,
        address: &ContractAddress,
        chain_id: &ChainId,
    ) -> Result<Option<DeploymentRecord>, StoreError>;

    /// Records an approved origin for an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn put_admin(&self, record: &AdminRecord) -> Result<(), StoreError>;

    /// Loads the admin record for an `(address, origin)` key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn admin(
        &self,
        address: &ContractAddress,
        origin: &Origin,
    ) -> Result<Option<AdminRecord>, StoreError>;
}
