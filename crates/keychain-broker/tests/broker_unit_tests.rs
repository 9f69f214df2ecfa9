// crates/keychain-broker/tests/broker_unit_tests.rs
// ============================================================================
// Module: Request Broker Unit Tests
// Description: Unit tests for the single-slot pending-request broker.
// Purpose: Validate overwrite, single-use resolution, and slot snapshots.
// Dependencies: keychain-broker, keychain-core, tokio
// ============================================================================

//! ## Overview
//! Exercises [`keychain_broker::RequestBroker`] slot behavior: submission
//! and overwrite, snapshot reads, single-use resolution and rejection,
//! kind-checked claims, and clearing without settlement.

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

use keychain_broker::BrokerError;
use keychain_broker::RequestBroker;
use keychain_broker::Superseded;
use keychain_core::PendingAction;
use keychain_core::PendingRequest;
use keychain_core::Policy;
use keychain_core::ResponseCode;
use keychain_core::ResponseEnvelope;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn connect_request(origin: &str) -> PendingRequest {
    PendingRequest {
        origin: origin.into(),
        action: PendingAction::Connect {
            policies: vec![Policy {
                target: "0xgame".into(),
                method: "attack".into(),
            }],
            starter_pack_id: None,
        },
    }
}

fn logout_request(origin: &str) -> PendingRequest {
    PendingRequest {
        origin: origin.into(),
        action: PendingAction::Logout,
    }
}

// ============================================================================
// SECTION: Submission and Snapshot Tests
// ============================================================================

#[tokio::test]
async fn submitted_request_is_visible_in_snapshot() {
    let broker = RequestBroker::new();
    let request = connect_request("https://game.example");
    let _handle = broker.submit(request.clone());
    assert_eq!(broker.current().unwrap(), Some(request));
}

#[tokio::test]
async fn empty_broker_snapshot_is_none() {
    let broker = RequestBroker::new();
    assert_eq!(broker.current().unwrap(), None);
}

#[tokio::test]
async fn newer_submission_overwrites_the_slot() {
    let broker = RequestBroker::new();
    let _first = broker.submit(connect_request("https://one.example"));
    let second = logout_request("https://two.example");
    let _second_handle = broker.submit(second.clone());
    assert_eq!(broker.current().unwrap(), Some(second));
}

// ============================================================================
// SECTION: Resolution Tests
// ============================================================================

#[tokio::test]
async fn resolution_settles_the_handle_and_clears_the_slot() {
    let broker = RequestBroker::new();
    let handle = broker.submit(connect_request("https://game.example"));
    broker.resolve_current(ResponseEnvelope::success()).unwrap();
    let envelope = handle.wait().await.unwrap();
    assert!(envelope.is_success());
    assert_eq!(broker.current().unwrap(), None);
}

#[tokio::test]
async fn resolution_is_single_use_per_submission() {
    let broker = RequestBroker::new();
    let _handle = broker.submit(connect_request("https://game.example"));
    broker.resolve_current(ResponseEnvelope::success()).unwrap();
    assert!(matches!(
        broker.resolve_current(ResponseEnvelope::success()),
        Err(BrokerError::Empty)
    ));
}

#[tokio::test]
async fn resolving_an_empty_slot_is_an_error() {
    let broker = RequestBroker::new();
    assert!(matches!(
        broker.resolve_current(ResponseEnvelope::success()),
        Err(BrokerError::Empty)
    ));
}

#[tokio::test]
async fn rejection_delivers_a_canceled_envelope_with_the_reason() {
    let broker = RequestBroker::new();
    let handle = broker.submit(logout_request("https://game.example"));
    broker.reject_current("User cancelled logout").unwrap();
    let envelope = handle.wait().await.unwrap();
    assert_eq!(envelope.code, ResponseCode::Canceled);
    assert_eq!(envelope.message.as_deref(), Some("User cancelled logout"));
}

#[tokio::test]
async fn resolution_after_the_caller_went_away_is_not_an_error() {
    let broker = RequestBroker::new();
    let handle = broker.submit(connect_request("https://game.example"));
    drop(handle);
    broker.resolve_current(ResponseEnvelope::success()).unwrap();
}

// ============================================================================
// SECTION: Claim Tests
// ============================================================================

#[tokio::test]
async fn claim_settles_the_claimed_caller_not_a_newer_occupant() {
    let broker = RequestBroker::new();
    let first = broker.submit(connect_request("https://one.example"));
    let claimed = broker.claim("connect").unwrap();
    assert_eq!(claimed.request().origin.as_str(), "https://one.example");
    assert_eq!(broker.current().unwrap(), None);
    let second = broker.submit(logout_request("https://two.example"));
    claimed.resolve(ResponseEnvelope::success());
    assert!(first.wait().await.unwrap().is_success());
    broker.reject_current("Canceled").unwrap();
    let envelope = second.wait().await.unwrap();
    assert_eq!(envelope.code, ResponseCode::Canceled);
}

#[tokio::test]
async fn claim_of_a_mismatched_kind_leaves_the_slot_intact() {
    let broker = RequestBroker::new();
    let _handle = broker.submit(logout_request("https://game.example"));
    assert!(matches!(
        broker.claim("connect"),
        Err(BrokerError::Mismatch {
            expected: "connect",
            actual: "logout",
        })
    ));
    assert!(broker.current().unwrap().is_some());
}

#[tokio::test]
async fn claiming_an_empty_slot_is_an_error() {
    let broker = RequestBroker::new();
    assert!(matches!(broker.claim("connect"), Err(BrokerError::Empty)));
}

// ============================================================================
// SECTION: Supersession Tests
// ============================================================================

#[tokio::test]
async fn overwritten_handle_observes_supersession_not_an_envelope() {
    let broker = RequestBroker::new();
    let first = broker.submit(connect_request("https://one.example"));
    let second = broker.submit(connect_request("https://two.example"));
    broker.resolve_current(ResponseEnvelope::success()).unwrap();
    assert_eq!(first.wait().await, Err(Superseded));
    assert!(second.wait().await.unwrap().is_success());
}

#[tokio::test]
async fn clear_drops_the_occupant_without_settlement() {
    let broker = RequestBroker::new();
    let handle = broker.submit(connect_request("https://game.example"));
    broker.clear();
    assert_eq!(broker.current().unwrap(), None);
    assert_eq!(handle.wait().await, Err(Superseded));
}
