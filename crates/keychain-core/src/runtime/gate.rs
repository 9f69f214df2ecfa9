// crates/keychain-core/src/runtime/gate.rs
// ============================================================================
// Module: Keychain Gate Decisions
// Description: Pure checks for connect auto-approval and execute gating.
// Purpose: Decide auto-approve versus escalate without rendering or I/O.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Pure decision helpers for the execution gate. Each check takes snapshots
//! (session, account status, request) and either passes or produces the
//! exact refusal envelope for the caller. Keeping these free of storage and
//! backend access lets the orchestrator sequence them around its suspension
//! points while the decisions stay unit-testable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccountStatus;
use crate::core::Call;
use crate::core::FeeAmount;
use crate::core::Policy;
use crate::core::ResponseEnvelope;
use crate::core::Session;
use crate::core::diff;

// ============================================================================
// SECTION: Connect Decision
// ============================================================================

/// Outcome of the connect pre-check.
///
/// # Invariants
/// - `Covered` is returned only when an existing session grants every
///   requested policy under the structural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectDecision {
    /// An existing session already covers the request; auto-resolve.
    Covered,
    /// No covering session exists; escalate to the broker.
    Escalate,
}

/// Decides whether a connect request is covered by an existing session.
#[must_use]
pub fn connect_decision(session: Option<&Session>, requested: &[Policy]) -> ConnectDecision {
    match session {
        Some(session) if diff(requested, &session.policies).is_empty() => ConnectDecision::Covered,
        _ => ConnectDecision::Escalate,
    }
}

// ============================================================================
// SECTION: Execute Checks
// ============================================================================

/// Derives the policy set required to authorize a call batch.
///
/// Preserves batch order and deduplicates by the structural key.
#[must_use]
pub fn required_policies(calls: &[Call]) -> Vec<Policy> {
    let mut required: Vec<Policy> = Vec::new();
    for call in calls {
        let policy = call.required_policy();
        if !required.contains(&policy) {
            required.push(policy);
        }
    }
    required
}

/// Checks that the account status permits the auto execute path.
///
/// Returns the refusal envelope when the account is not ready.
#[must_use]
pub fn check_execution_status(status: AccountStatus) -> Option<ResponseEnvelope> {
    if status.can_execute() {
        None
    } else {
        Some(ResponseEnvelope::not_allowed("Account not registered or deployed."))
    }
}

/// Checks the granted policies against the batch's required set.
///
/// Returns the refusal envelope listing the missing policies when the grant
/// has a gap.
#[must_use]
pub fn check_policy_gap(required: &[Policy], granted: &[Policy]) -> Option<ResponseEnvelope> {
    let missing = diff(required, granted);
    if missing.is_empty() {
        return None;
    }
    let listing = serde_json::to_string(&missing)
        .unwrap_or_else(|_| format!("{} unserializable policies", missing.len()));
    Some(ResponseEnvelope::not_allowed(format!("Missing policies: {listing}")))
}

/// Checks the effective fee against the session's ceiling.
///
/// Returns the refusal envelope with the numeric comparison when the
/// effective fee exceeds the ceiling.
#[must_use]
pub fn check_fee_ceiling(
    effective: FeeAmount,
    ceiling: Option<FeeAmount>,
) -> Option<ResponseEnvelope> {
    match ceiling {
        Some(ceiling) if effective > ceiling => Some(ResponseEnvelope::not_allowed(format!(
            "Max fee exceeded: {effective} > {ceiling}"
        ))),
        _ => None,
    }
}
