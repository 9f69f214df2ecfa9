// crates/keychain-core/src/core/pending.rs
// ============================================================================
// Module: Keychain Pending Requests
// Description: Tagged descriptions of actions awaiting human resolution.
// Purpose: Describe escalated requests for the confirmation renderer.
// Dependencies: crate::core::{identifiers, policy}, serde, serde_json
// ============================================================================

//! ## Overview
//! A pending request is a tagged description of an action awaiting human
//! resolution, scoped to the caller origin that raised it. The variant set is
//! exhaustive; every consumer must match all cases. Deferred resolution
//! callbacks are attached by the broker, not carried here, so descriptions
//! stay cloneable snapshots for the renderer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ContractAddress;
use crate::core::identifiers::Origin;
use crate::core::policy::Call;
use crate::core::policy::ExecuteDetails;
use crate::core::policy::Policy;

// ============================================================================
// SECTION: Pending Actions
// ============================================================================

/// Action kinds that require human confirmation.
///
/// # Invariants
/// - Variants are stable for serialization and renderer dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PendingAction {
    /// Grant or escalate a session for the origin.
    Connect {
        /// Policies the caller requested.
        policies: Vec<Policy>,
        /// Optional starter pack to issue after approval.
        #[serde(default)]
        starter_pack_id: Option<String>,
    },
    /// Destroy the origin's session after confirmation.
    Logout,
    /// Submit a transaction batch after confirmation.
    Execute {
        /// Calls in the batch.
        calls: Vec<Call>,
        /// Caller-supplied fee and nonce details.
        #[serde(default)]
        details: Option<ExecuteDetails>,
    },
    /// Sign a typed message after confirmation.
    SignMessage {
        /// Typed payload to sign.
        typed_data: Value,
        /// Account address the signature is requested for.
        account_address: ContractAddress,
    },
    /// Issue a starter pack after confirmation.
    StarterPack {
        /// Starter pack identifier.
        starter_pack_id: String,
    },
    /// Show quest state for a game after confirmation.
    Quests {
        /// Game identifier.
        game_id: String,
    },
}

impl PendingAction {
    /// Returns a stable label for the action kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Logout => "logout",
            Self::Execute { .. } => "execute",
            Self::SignMessage { .. } => "sign-message",
            Self::StarterPack { .. } => "starter-pack",
            Self::Quests { .. } => "quests",
        }
    }
}

// ============================================================================
// SECTION: Pending Request
// ============================================================================

/// Escalated request awaiting human resolution.
///
/// # Invariants
/// - `origin` is the normalized origin that raised the request; the human
///   decision applies only to that origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Origin that raised the request.
    pub origin: Origin,
    /// Action awaiting confirmation.
    pub action: PendingAction,
}
