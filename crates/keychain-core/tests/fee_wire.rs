// crates/keychain-core/tests/fee_wire.rs
// ============================================================================
// Module: Fee Amount Wire Tests
// Description: Wire-format tests for fee amounts.
// Purpose: Validate decimal-string serialization and tolerant deserialization.
// Dependencies: keychain-core, serde_json
// ============================================================================

//! ## Overview
//! Fee amounts cross the wire as decimal strings so the full `u128` range
//! survives JSON stacks whose numbers cap at 53 bits. Deserialization also
//! accepts bare integers for callers that send small fees numerically.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use keychain_core::FeeAmount;
use serde_json::json;

// ============================================================================
// SECTION: Serialization
// ============================================================================

#[test]
fn fee_serializes_as_a_decimal_string() {
    let value = serde_json::to_value(FeeAmount::new(40)).unwrap();
    assert_eq!(value, json!("40"));
}

#[test]
fn fee_above_the_double_precision_range_survives_a_round_trip() {
    let fee = FeeAmount::new(u128::MAX);
    let encoded = serde_json::to_string(&fee).unwrap();
    assert_eq!(encoded, format!("\"{}\"", u128::MAX));
    let decoded: FeeAmount = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, fee);
}

// ============================================================================
// SECTION: Deserialization
// ============================================================================

#[test]
fn fee_deserializes_from_a_decimal_string() {
    let fee: FeeAmount = serde_json::from_value(json!("12500")).unwrap();
    assert_eq!(fee, FeeAmount::new(12_500));
}

#[test]
fn fee_deserializes_from_a_bare_integer() {
    let fee: FeeAmount = serde_json::from_value(json!(40)).unwrap();
    assert_eq!(fee, FeeAmount::new(40));
}

#[test]
fn non_decimal_fee_strings_are_rejected() {
    assert!(serde_json::from_value::<FeeAmount>(json!("0x28")).is_err());
    assert!(serde_json::from_value::<FeeAmount>(json!("")).is_err());
    assert!(serde_json::from_value::<FeeAmount>(json!("-5")).is_err());
}
