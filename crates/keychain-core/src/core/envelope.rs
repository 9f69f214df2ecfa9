// crates/keychain-core/src/core/envelope.rs
// ============================================================================
// Module: Keychain Response Envelope
// Description: Response codes and the envelope returned for every method call.
// Purpose: Keep the caller boundary exception-free with structured responses.
// Dependencies: crate::core::{identifiers, policy}, serde, serde_json
// ============================================================================

//! ## Overview
//! Every method invocation returns a [`ResponseEnvelope`], synchronously or
//! after human resolution. Errors are never thrown across the caller
//! boundary; every failure path maps to one of the four response codes with
//! a human-readable reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ContractAddress;
use crate::core::policy::Policy;

// ============================================================================
// SECTION: Response Codes
// ============================================================================

/// Outcome code for a caller-facing method invocation.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    /// The request completed successfully.
    Success,
    /// The human owner refused the request at an escalation point.
    Canceled,
    /// No controller is loaded or no session exists for the origin.
    NotConnected,
    /// A policy gap or fee-ceiling breach blocked the request.
    NotAllowed,
}

// ============================================================================
// SECTION: Response Envelope
// ============================================================================

/// Structured response returned to the caller for every method invocation.
///
/// # Invariants
/// - `NOT_ALLOWED` envelopes always carry a human-readable reason.
/// - `payload` is present only on `SUCCESS` envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Outcome code.
    pub code: ResponseCode,
    /// Human-readable reason, when the outcome is not a bare success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured success payload, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ResponseEnvelope {
    /// Builds a success envelope without a payload.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            code: ResponseCode::Success,
            message: None,
            payload: None,
        }
    }

    /// Builds a success envelope carrying a serialized payload.
    #[must_use]
    pub fn success_with<T: Serialize>(payload: &T) -> Self {
        Self {
            code: ResponseCode::Success,
            message: None,
            payload: serde_json::to_value(payload).ok(),
        }
    }

    /// Builds a canceled envelope with a reason.
    #[must_use]
    pub fn canceled(message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::Canceled,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Builds a not-connected envelope with a reason.
    #[must_use]
    pub fn not_connected(message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::NotConnected,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Builds a not-allowed envelope with a reason.
    #[must_use]
    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::NotAllowed,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Returns whether the envelope is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Success
    }
}

// ============================================================================
// SECTION: Reply Payloads
// ============================================================================

/// Success payload for `connect`.
///
/// # Invariants
/// - `policies` are exactly the policies the session was approved with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectReply {
    /// Connected account address.
    pub address: ContractAddress,
    /// Approved policies.
    pub policies: Vec<Policy>,
}

/// Success payload for `execute` and starter-pack issuance.
///
/// # Invariants
/// - `transaction_hash` identifies the submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteReply {
    /// Hash of the submitted transaction.
    pub transaction_hash: String,
}

/// Success payload for `probe`.
///
/// # Invariants
/// - Mirrors the current session's grant for the calling origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReply {
    /// Connected account address.
    pub address: ContractAddress,
    /// Policies granted to the calling origin.
    pub policies: Vec<Policy>,
}
