// crates/keychain-core/src/core/account.rs
// ============================================================================
// Module: Keychain Account State
// Description: Account deployment lifecycle status and its classifier.
// Purpose: Interpret live account status into the allowed next action.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The account state supervisor is a pure classifier over the deployment
//! lifecycle of an on-chain account. Status is supplied by the external
//! execution environment per `(address, chain)` query at decision time and is
//! never cached across gate decisions; this module only interprets it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Account Status
// ============================================================================

/// Deployment lifecycle status of an on-chain account.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account address is derived but not yet deployed on-chain.
    Counterfactual,
    /// Account is deployed but this device's credential is not registered.
    Deployed,
    /// Device-credential registration is in flight.
    Registering,
    /// Account is deployed and this device is registered to sign.
    Registered,
}

/// Next action the gate must take for an account status.
///
/// # Invariants
/// - Variants are stable and exhaustive over [`AccountStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// Account is ready; the requested action may proceed.
    Proceed,
    /// Device registration must complete before the action proceeds.
    RegisterDevice,
    /// Account must be deployed before the action proceeds.
    Deploy,
}

impl AccountStatus {
    /// Classifies the allowed next action for this status.
    #[must_use]
    pub const fn next_action(self) -> NextAction {
        match self {
            Self::Counterfactual => NextAction::Deploy,
            Self::Deployed => NextAction::RegisterDevice,
            Self::Registering | Self::Registered => NextAction::Proceed,
        }
    }

    /// Returns whether the auto execute path may run for this status.
    #[must_use]
    pub const fn can_execute(self) -> bool {
        matches!(self, Self::Registered | Self::Registering)
    }
}
