// crates/keychain-store/src/lib.rs
// ============================================================================
// Module: Keychain Store Library
// Description: Keyed, schema-versioned persistence for controller state.
// Purpose: Persist sessions and controller records behind a storage backend.
// Dependencies: keychain-core, serde_json
// ============================================================================

//! ## Overview
//! Keychain Store persists session grants and controller bookkeeping records
//! as JSON values under schema-versioned composite keys. The storage backend
//! is pluggable; an in-memory backend is provided for embedded use and
//! tests. Records written under a different schema version are invisible to
//! the current version rather than being misread.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod selectors;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::InMemoryBackend;
pub use backend::StorageBackend;
pub use store::ControllerStore;
