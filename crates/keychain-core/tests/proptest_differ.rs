// crates/keychain-core/tests/proptest_differ.rs
// ============================================================================
// Module: Policy Differ Property Tests
// Description: Property-based tests for the policy differ.
// Purpose: Validate differ invariants over generated request and grant sets.
// Dependencies: keychain-core, proptest
// ============================================================================

//! ## Overview
//! Property tests over [`keychain_core::diff`]: the missing set is always a
//! duplicate-free, order-preserving subset of the request with no overlap
//! with the grant, and emptiness coincides exactly with full coverage.

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

use keychain_core::Policy;
use keychain_core::diff;
use proptest::prelude::*;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Draws policies from small pools so requests and grants overlap often.
fn policy_strategy() -> impl Strategy<Value = Policy> {
    let targets = prop::sample::select(vec!["0xgame", "0xbank", "0xguild"]);
    let methods = prop::sample::select(vec!["attack", "move", "transfer", "join"]);
    (targets, methods).prop_map(|(target, method)| Policy {
        target: target.into(),
        method: method.into(),
    })
}

/// Policy vectors sized to exercise both empty and overlapping cases.
fn policies_strategy() -> impl Strategy<Value = Vec<Policy>> {
    prop::collection::vec(policy_strategy(), 0..8)
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn missing_never_overlaps_grant(
        required in policies_strategy(),
        granted in policies_strategy(),
    ) {
        let missing = diff(&required, &granted);
        for policy in &missing {
            prop_assert!(required.contains(policy));
            prop_assert!(!granted.contains(policy));
        }
    }

    #[test]
    fn missing_has_no_duplicates(
        required in policies_strategy(),
        granted in policies_strategy(),
    ) {
        let missing = diff(&required, &granted);
        for (index, policy) in missing.iter().enumerate() {
            prop_assert!(!missing[..index].contains(policy));
        }
    }

    #[test]
    fn empty_missing_means_full_coverage(
        required in policies_strategy(),
        granted in policies_strategy(),
    ) {
        let missing = diff(&required, &granted);
        let covered = required.iter().all(|policy| granted.contains(policy));
        prop_assert_eq!(missing.is_empty(), covered);
    }

    #[test]
    fn missing_preserves_request_order(
        required in policies_strategy(),
        granted in policies_strategy(),
    ) {
        let missing = diff(&required, &granted);
        // First-occurrence positions in the request must be increasing.
        let positions: Vec<usize> = missing
            .iter()
            .map(|policy| {
                required
                    .iter()
                    .position(|candidate| candidate == policy)
                    .unwrap()
            })
            .collect();
        for window in positions.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn self_diff_is_empty(required in policies_strategy()) {
        prop_assert!(diff(&required, &required).is_empty());
    }
}
