// crates/keychain-core/src/runtime/mod.rs
// ============================================================================
// Module: Keychain Runtime Helpers
// Description: Pure decision helpers shared by gate orchestrators.
// Purpose: Group runtime modules behind one namespace.
// Dependencies: crate::runtime::gate
// ============================================================================

//! ## Overview
//! Runtime helpers hold the pure decision functions of the execution gate.
//! Orchestration against live backends happens in the RPC crate; everything
//! here is deterministic and side-effect free.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gate;
