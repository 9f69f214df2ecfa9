// crates/keychain-core/src/core/session.rs
// ============================================================================
// Module: Keychain Sessions
// Description: Session grants and persisted controller records.
// Purpose: Capture per-origin authorization grants and account bookkeeping.
// Dependencies: crate::core::{identifiers, policy}, serde
// ============================================================================

//! ## Overview
//! A session is a per-origin grant of policies and an optional fee ceiling to
//! act on behalf of an account on one chain. Sessions are created only by a
//! successful connect approval, replaced whole on re-approval, and destroyed
//! by revoke or logout. The record types here are owned by the session store;
//! no other component mutates them directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::account::AccountStatus;
use crate::core::identifiers::ChainId;
use crate::core::identifiers::ContractAddress;
use crate::core::identifiers::FeeAmount;
use crate::core::identifiers::Origin;
use crate::core::policy::Policy;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Per-origin grant of policies and an optional fee ceiling.
///
/// # Invariants
/// - Uniquely identified by `(account_address, origin, chain_id)`.
/// - `policies` has no duplicates under the structural `(target, method)` key.
/// - Replaced whole on re-approval; never merged in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Account the grant acts on behalf of.
    pub account_address: ContractAddress,
    /// Normalized caller origin holding the grant.
    pub origin: Origin,
    /// Chain the grant is scoped to.
    pub chain_id: ChainId,
    /// Granted policies.
    pub policies: Vec<Policy>,
    /// Maximum fee the session may authorize without re-escalation.
    #[serde(default)]
    pub max_fee: Option<FeeAmount>,
}

// ============================================================================
// SECTION: Controller Records
// ============================================================================

/// Persisted record for a provisioned controller account.
///
/// # Invariants
/// - `address` is the storage key component; one record per address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerRecord {
    /// Account address of the controller.
    pub address: ContractAddress,
}

/// Persisted per-(address, chain) deployment record.
///
/// # Invariants
/// - `status` is a bookkeeping hint only; gate decisions always re-query the
///   execution environment for live status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Account address.
    pub address: ContractAddress,
    /// Chain the deployment applies to.
    pub chain_id: ChainId,
    /// Last observed deployment status.
    pub status: AccountStatus,
}

/// Persisted per-(address, origin) admin record for approved origins.
///
/// # Invariants
/// - Written on connect approval; presence marks an origin the owner has
///   approved at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    /// Account address.
    pub address: ContractAddress,
    /// Approved caller origin.
    pub origin: Origin,
}
