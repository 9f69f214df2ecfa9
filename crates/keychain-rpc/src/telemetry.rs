// crates/keychain-rpc/src/telemetry.rs
// ============================================================================
// Module: RPC Telemetry
// Description: Observability hooks for bridge method dispatch.
// Purpose: Provide method and outcome labels without hard dependencies.
// Dependencies: keychain-core
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for bridge request counters.
//! It is intentionally dependency-light so embedders can plug in their own
//! telemetry pipeline without redesign. Labels never carry payloads,
//! origins, or policy contents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use keychain_core::ResponseCode;
use keychain_core::ResponseEnvelope;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Bridge method classification for telemetry labeling.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MethodName {
    /// `connect` method.
    Connect,
    /// `disconnect` method.
    Disconnect,
    /// `execute` method.
    Execute,
    /// `estimateInvokeFee` method.
    EstimateInvokeFee,
    /// `estimateDeclareFee` method.
    EstimateDeclareFee,
    /// `signMessage` method.
    SignMessage,
    /// `provision` method.
    Provision,
    /// `register` method.
    Register,
    /// `login` method.
    Login,
    /// `logout` method.
    Logout,
    /// `probe` method.
    Probe,
    /// `revoke` method.
    Revoke,
    /// `session` method.
    Session,
    /// `sessions` method.
    Sessions,
    /// `reset` method.
    Reset,
    /// `issueStarterPack` method.
    IssueStarterPack,
    /// `showQuests` method.
    ShowQuests,
}

impl MethodName {
    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Execute => "execute",
            Self::EstimateInvokeFee => "estimateInvokeFee",
            Self::EstimateDeclareFee => "estimateDeclareFee",
            Self::SignMessage => "signMessage",
            Self::Provision => "provision",
            Self::Register => "register",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Probe => "probe",
            Self::Revoke => "revoke",
            Self::Session => "session",
            Self::Sessions => "sessions",
            Self::Reset => "reset",
            Self::IssueStarterPack => "issueStarterPack",
            Self::ShowQuests => "showQuests",
        }
    }
}

/// Bridge request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CallOutcome {
    /// Request resolved with `SUCCESS`.
    Success,
    /// Request resolved with `CANCELED`.
    Canceled,
    /// Request resolved with `NOT_CONNECTED`.
    NotConnected,
    /// Request resolved with `NOT_ALLOWED`.
    NotAllowed,
    /// Request never settled (superseded escalation or teardown).
    Unsettled,
}

impl CallOutcome {
    /// Classifies a dispatch result into an outcome label.
    #[must_use]
    pub const fn from_response(response: Option<&ResponseEnvelope>) -> Self {
        match response {
            Some(envelope) => match envelope.code {
                ResponseCode::Success => Self::Success,
                ResponseCode::Canceled => Self::Canceled,
                ResponseCode::NotConnected => Self::NotConnected,
                ResponseCode::NotAllowed => Self::NotAllowed,
            },
            None => Self::Unsettled,
        }
    }

    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Canceled => "canceled",
            Self::NotConnected => "not_connected",
            Self::NotAllowed => "not_allowed",
            Self::Unsettled => "unsettled",
        }
    }
}

// ============================================================================
// SECTION: Metrics Sink
// ============================================================================

/// Sink receiving one event per dispatched bridge call.
pub trait MetricsSink: Send + Sync {
    /// Records a dispatched call and its outcome.
    fn record_call(&self, method: MethodName, outcome: CallOutcome);
}

/// Metrics sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_call(&self, _method: MethodName, _outcome: CallOutcome) {}
}
