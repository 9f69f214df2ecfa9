// crates/keychain-core/src/core/identifiers.rs
// ============================================================================
// Module: Keychain Identifiers
// Description: Canonical opaque identifiers for accounts, chains, and origins.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Keychain.
//! Identifiers are opaque and serialize as strings or numbers on the wire.
//! Origins are normalized by the RPC channel layer before construction; this
//! module does not re-normalize.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de;
use serde::de::Visitor;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Contract address of an on-chain account or call target.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Creates a new contract address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ContractAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContractAddress {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Entry-point selector on a target contract.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

impl Selector {
    /// Creates a new selector.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// Returns the selector as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Selector {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Chain identifier scoping sessions and deployments.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Creates a new chain identifier.
    #[must_use]
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self(chain_id.into())
    }

    /// Returns the chain identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Normalized caller origin (scheme + host + port, lowercase).
///
/// # Invariants
/// - Carries no path, query, or fragment component.
/// - Constructed by the channel layer after normalization; the string is
///   treated as opaque everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Creates a new origin from an already-normalized string.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    /// Returns the origin as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Origin {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Origin {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Fee Amounts
// ============================================================================

/// Transaction fee amount in the chain's smallest unit.
///
/// # Invariants
/// - Ordered comparisons are exact integer comparisons; ceiling checks never
///   round.
/// - Serializes as a decimal string so the full `u128` range survives JSON
///   stacks that cap numbers at 53 bits; deserialization accepts decimal
///   strings and bare integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FeeAmount(u128);

impl FeeAmount {
    /// Creates a new fee amount.
    #[must_use]
    pub const fn new(amount: u128) -> Self {
        Self(amount)
    }

    /// Returns the raw amount.
    #[must_use]
    pub const fn get(self) -> u128 {
        self.0
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u128> for FeeAmount {
    fn from(value: u128) -> Self {
        Self::new(value)
    }
}

impl Serialize for FeeAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

/// Visitor accepting decimal-string and bare-integer fee amounts.
struct FeeAmountVisitor;

impl Visitor<'_> for FeeAmountVisitor {
    type Value = FeeAmount;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a decimal string or integer fee amount")
    }

    fn visit_str<E>(self, value: &str) -> Result<FeeAmount, E>
    where
        E: de::Error,
    {
        value
            .parse::<u128>()
            .map(FeeAmount)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_u64<E>(self, value: u64) -> Result<FeeAmount, E>
    where
        E: de::Error,
    {
        Ok(FeeAmount(u128::from(value)))
    }

    fn visit_u128<E>(self, value: u128) -> Result<FeeAmount, E>
    where
        E: de::Error,
    {
        Ok(FeeAmount(value))
    }
}

impl<'de> Deserialize<'de> for FeeAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FeeAmountVisitor)
    }
}
