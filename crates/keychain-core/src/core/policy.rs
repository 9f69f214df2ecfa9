// crates/keychain-core/src/core/policy.rs
// ============================================================================
// Module: Keychain Policies
// Description: Authorization policies, call batches, and the policy differ.
// Purpose: Compute authorization gaps between requested and granted policies.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A policy scopes a single permitted `(target, method)` pair. A call batch
//! derives its required policy set from the target and entry point of each
//! call. The differ returns the policies a grant is missing, preserving
//! request order and deduplicating by the structural key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ChainId;
use crate::core::identifiers::ContractAddress;
use crate::core::identifiers::FeeAmount;
use crate::core::identifiers::Selector;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Authorization unit scoping a permitted `(target, method)` pair.
///
/// # Invariants
/// - Equality is structural on `(target, method)`; ordering inside a policy
///   set carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
    /// Contract address the policy permits calling.
    pub target: ContractAddress,
    /// Entry-point selector the policy permits invoking.
    pub method: Selector,
}

impl Policy {
    /// Creates a new policy for a target and method.
    #[must_use]
    pub fn new(target: impl Into<ContractAddress>, method: impl Into<Selector>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
        }
    }
}

// ============================================================================
// SECTION: Calls
// ============================================================================

/// Single contract call inside a transaction batch.
///
/// # Invariants
/// - `calldata` is opaque to the authorization layer; only `(target, method)`
///   participates in policy matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Contract address to call.
    pub target: ContractAddress,
    /// Entry-point selector to invoke.
    pub method: Selector,
    /// Raw calldata for the invocation.
    #[serde(default)]
    pub calldata: Vec<String>,
}

impl Call {
    /// Returns the policy required to authorize this call.
    #[must_use]
    pub fn required_policy(&self) -> Policy {
        Policy {
            target: self.target.clone(),
            method: self.method.clone(),
        }
    }
}

/// Caller-supplied execution details for a transaction batch.
///
/// # Invariants
/// - A `None` fee defers to the external estimator at execution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteDetails {
    /// Caller-supplied fee limit, if any.
    #[serde(default)]
    pub max_fee: Option<FeeAmount>,
    /// Caller-supplied nonce, if any.
    #[serde(default)]
    pub nonce: Option<String>,
    /// Chain override for this batch, if any.
    #[serde(default)]
    pub chain_id: Option<ChainId>,
}

// ============================================================================
// SECTION: Policy Differ
// ============================================================================

/// Returns every required policy absent from the granted set.
///
/// Preserves the order of `required`, deduplicates by the structural
/// `(target, method)` key, and ignores the position of matches in `granted`.
#[must_use]
pub fn diff(required: &[Policy], granted: &[Policy]) -> Vec<Policy> {
    let mut missing: Vec<Policy> = Vec::new();
    for policy in required {
        if granted.contains(policy) || missing.contains(policy) {
            continue;
        }
        missing.push(policy.clone());
    }
    missing
}
