// crates/keychain-core/src/core/mod.rs
// ============================================================================
// Module: Keychain Core Data Model
// Description: Canonical data model for sessions, policies, and requests.
// Purpose: Group the core type modules behind one namespace.
// Dependencies: crate::core::{account, envelope, identifiers, pending, policy, session}
// ============================================================================

//! ## Overview
//! The core data model groups identifiers, authorization policies, session
//! grants, account lifecycle status, pending-request descriptions, and the
//! response envelope returned for every caller-facing method.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod account;
pub mod envelope;
pub mod identifiers;
pub mod pending;
pub mod policy;
pub mod session;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use account::AccountStatus;
pub use account::NextAction;
pub use envelope::ConnectReply;
pub use envelope::ExecuteReply;
pub use envelope::ProbeReply;
pub use envelope::ResponseCode;
pub use envelope::ResponseEnvelope;
pub use identifiers::ChainId;
pub use identifiers::ContractAddress;
pub use identifiers::FeeAmount;
pub use identifiers::Origin;
pub use identifiers::Selector;
pub use pending::PendingAction;
pub use pending::PendingRequest;
pub use policy::Call;
pub use policy::ExecuteDetails;
pub use policy::Policy;
pub use policy::diff;
pub use session::AdminRecord;
pub use session::ControllerRecord;
pub use session::DeploymentRecord;
pub use session::Session;
