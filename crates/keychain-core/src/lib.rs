// crates/keychain-core/src/lib.rs
// ============================================================================
// Module: Keychain Core Library
// Description: Public API surface for the Keychain core.
// Purpose: Expose core types, interfaces, and gate decision helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Keychain core provides the data model and decision logic for an embedded
//! authorization broker mediating between an untrusted caller origin and a
//! user-controlled on-chain account. It is backend-agnostic and integrates
//! with execution environments and persistence through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use interfaces::BackendError;
pub use interfaces::ControllerRegistry;
pub use interfaces::ExecutionBackend;
pub use interfaces::ExecutionReceipt;
pub use interfaces::FeeEstimate;
pub use interfaces::SessionStore;
pub use interfaces::StoreError;
pub use runtime::gate::ConnectDecision;
pub use runtime::gate::check_execution_status;
pub use runtime::gate::check_fee_ceiling;
pub use runtime::gate::check_policy_gap;
pub use runtime::gate::connect_decision;
pub use runtime::gate::required_policies;
pub use self::core::*;
