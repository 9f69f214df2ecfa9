// crates/keychain-store/src/selectors.rs
// ============================================================================
// Module: Keychain Storage Selectors
// Description: Schema-versioned composite key builders.
// Purpose: Keep persisted records addressable and version-isolated.
// Dependencies: keychain-core
// ============================================================================

//! ## Overview
//! Every persisted record lives under a key carrying the storage schema
//! version, so records written by an older version are never misread as the
//! current shape. Key layout:
//! `@keychain/<version>/<entity>[/<component>...]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use keychain_core::ChainId;
use keychain_core::ContractAddress;
use keychain_core::Origin;

// ============================================================================
// SECTION: Schema Version
// ============================================================================

/// Storage schema version tag baked into every key.
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// SECTION: Key Builders
// ============================================================================

/// Key for the active-controller pointer.
#[must_use]
pub fn active() -> String {
    format!("@keychain/{SCHEMA_VERSION}/active")
}

/// Key for a per-address account record.
#[must_use]
pub fn account(address: &ContractAddress) -> String {
    format!("@keychain/{SCHEMA_VERSION}/account/{address}")
}

/// Key for a per-(address, chain) deployment record.
#[must_use]
pub fn deployment(address: &ContractAddress, chain_id: &ChainId) -> String {
    format!("@keychain/{SCHEMA_VERSION}/deployment/{address}/{chain_id}")
}

/// Key for a per-(address, origin) admin record.
#[must_use]
pub fn admin(address: &ContractAddress, origin: &Origin) -> String {
    format!("@keychain/{SCHEMA_VERSION}/admin/{address}/{origin}")
}

/// Key for a per-(address, origin, chain) session record.
#[must_use]
pub fn session(address: &ContractAddress, origin: &Origin, chain_id: &ChainId) -> String {
    format!("@keychain/{SCHEMA_VERSION}/session/{address}/{origin}/{chain_id}")
}

/// Prefix shared by every session key for one account.
#[must_use]
pub fn session_prefix(address: &ContractAddress) -> String {
    format!("@keychain/{SCHEMA_VERSION}/session/{address}/")
}
