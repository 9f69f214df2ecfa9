// crates/keychain-broker/src/lib.rs
// ============================================================================
// Module: Keychain Broker Library
// Description: Single-slot pending-request mailbox with deferred resolution.
// Purpose: Hand off actions requiring human confirmation, one at a time.
// Dependencies: keychain-core, tokio
// ============================================================================

//! ## Overview
//! The Keychain broker holds the one action currently awaiting a human
//! decision. Submitting a new request overwrites the slot; the superseded
//! caller's handle observes [`Superseded`] and never receives an envelope.
//! Invariants:
//! - At most one pending request exists at any time.
//! - Stored responders are single-use; resolution clears the slot.
//! - Overwritten responders are dropped, never invoked.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod slot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use slot::BrokerError;
pub use slot::ClaimedRequest;
pub use slot::PendingHandle;
pub use slot::RequestBroker;
pub use slot::Superseded;
