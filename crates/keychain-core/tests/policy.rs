// crates/keychain-core/tests/policy.rs
// ============================================================================
// Module: Policy Differ Unit Tests
// Description: Unit tests for the policy differ and batch requirement set.
// Purpose: Validate structural matching, ordering, and deduplication.
// Dependencies: keychain-core
// ============================================================================

//! ## Overview
//! Exercises [`keychain_core::diff`] and [`keychain_core::required_policies`]
//! over crafted request and grant sets.

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

use keychain_core::Call;
use keychain_core::Policy;
use keychain_core::diff;
use keychain_core::required_policies;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn policy(target: &str, method: &str) -> Policy {
    Policy {
        target: target.into(),
        method: method.into(),
    }
}

fn call(target: &str, method: &str) -> Call {
    Call {
        target: target.into(),
        method: method.into(),
        calldata: vec![],
    }
}

// ============================================================================
// SECTION: Differ Tests
// ============================================================================

#[test]
fn diff_is_empty_when_grant_covers_request() {
    let required = vec![policy("0xgame", "attack"), policy("0xgame", "move")];
    let granted = vec![
        policy("0xgame", "move"),
        policy("0xgame", "attack"),
        policy("0xbank", "transfer"),
    ];
    assert!(diff(&required, &granted).is_empty());
}

#[test]
fn diff_reports_only_missing_policies() {
    let required = vec![policy("0xgame", "attack"), policy("0xbank", "transfer")];
    let granted = vec![policy("0xgame", "attack")];
    assert_eq!(diff(&required, &granted), vec![policy("0xbank", "transfer")]);
}

#[test]
fn diff_preserves_request_order() {
    let required = vec![
        policy("0xc", "three"),
        policy("0xa", "one"),
        policy("0xb", "two"),
    ];
    let missing = diff(&required, &[]);
    assert_eq!(missing, required);
}

#[test]
fn diff_deduplicates_repeated_requests() {
    let required = vec![
        policy("0xgame", "attack"),
        policy("0xgame", "attack"),
        policy("0xgame", "move"),
    ];
    let missing = diff(&required, &[]);
    assert_eq!(missing, vec![policy("0xgame", "attack"), policy("0xgame", "move")]);
}

#[test]
fn diff_matches_on_structural_key_only() {
    // Same target, different method is a different policy.
    let required = vec![policy("0xgame", "attack")];
    let granted = vec![policy("0xgame", "move")];
    assert_eq!(diff(&required, &granted), required);
}

#[test]
fn diff_of_empty_request_is_empty() {
    let granted = vec![policy("0xgame", "attack")];
    assert!(diff(&[], &granted).is_empty());
    assert!(diff(&[], &[]).is_empty());
}

// ============================================================================
// SECTION: Required Policy Tests
// ============================================================================

#[test]
fn required_policies_map_calls_to_target_method_pairs() {
    let calls = vec![call("0xgame", "attack"), call("0xbank", "transfer")];
    assert_eq!(
        required_policies(&calls),
        vec![policy("0xgame", "attack"), policy("0xbank", "transfer")]
    );
}

#[test]
fn required_policies_deduplicate_preserving_batch_order() {
    let calls = vec![
        call("0xgame", "attack"),
        call("0xgame", "attack"),
        call("0xgame", "move"),
        call("0xgame", "attack"),
    ];
    assert_eq!(
        required_policies(&calls),
        vec![policy("0xgame", "attack"), policy("0xgame", "move")]
    );
}

#[test]
fn required_policies_ignore_calldata() {
    let mut first = call("0xgame", "attack");
    first.calldata = vec!["0x1".to_string()];
    let mut second = call("0xgame", "attack");
    second.calldata = vec!["0x2".to_string()];
    assert_eq!(required_policies(&[first, second]).len(), 1);
}
