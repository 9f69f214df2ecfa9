// crates/keychain-rpc/tests/origin_and_wire_tests.rs
// ============================================================================
// Module: Origin and Wire Tests
// Description: Tests for origin normalization, the wire format, and channel.
// Purpose: Validate canonical origins, method decoding, and teardown.
// Dependencies: keychain-rpc, keychain-core, keychain-store, async-trait, tokio
// ============================================================================

//! ## Overview
//! Covers the transport edges of the bridge: raw-origin normalization, the
//! tagged method wire format, and the channel serve loop including teardown
//! behavior for unsettled callers.

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

use std::sync::Arc;

use async_trait::async_trait;
use keychain_core::AccountStatus;
use keychain_core::BackendError;
use keychain_core::Call;
use keychain_core::ChainId;
use keychain_core::ContractAddress;
use keychain_core::ControllerRecord;
use keychain_core::ControllerRegistry;
use keychain_core::ExecutionBackend;
use keychain_core::ExecutionReceipt;
use keychain_core::FeeAmount;
use keychain_core::FeeEstimate;
use keychain_core::Policy;
use keychain_core::ResponseCode;
use keychain_core::Session;
use keychain_core::SessionStore;
use keychain_rpc::Bridge;
use keychain_rpc::BridgeChannel;
use keychain_rpc::BridgeConfig;
use keychain_rpc::MethodCall;
use keychain_rpc::NoopMetrics;
use keychain_rpc::normalize_origin;
use keychain_store::ControllerStore;
use keychain_store::InMemoryBackend;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Stub Backend
// ============================================================================

/// Minimal backend whose account is always ready.
struct ReadyBackend;

#[async_trait]
impl ExecutionBackend for ReadyBackend {
    async fn account_status(
        &self,
        _address: &ContractAddress,
        _chain_id: &ChainId,
    ) -> Result<AccountStatus, BackendError> {
        Ok(AccountStatus::Registered)
    }

    async fn estimate_invoke_fee(
        &self,
        _address: &ContractAddress,
        _chain_id: &ChainId,
        _calls: &[Call],
    ) -> Result<FeeEstimate, BackendError> {
        Ok(FeeEstimate {
            suggested_max_fee: FeeAmount::new(10),
        })
    }

    async fn estimate_declare_fee(
        &self,
        _address: &ContractAddress,
        _chain_id: &ChainId,
        _payload: &Value,
    ) -> Result<FeeEstimate, BackendError> {
        Ok(FeeEstimate {
            suggested_max_fee: FeeAmount::new(10),
        })
    }

    async fn execute(
        &self,
        _address: &ContractAddress,
        _chain_id: &ChainId,
        _calls: &[Call],
        _max_fee: FeeAmount,
    ) -> Result<ExecutionReceipt, BackendError> {
        Ok(ExecutionReceipt {
            transaction_hash: "0xtxhash".to_string(),
        })
    }

    async fn register(
        &self,
        _address: &ContractAddress,
        _chain_id: &ChainId,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Fixture
// ============================================================================

const ORIGIN: &str = "https://game.example";

fn bridge() -> (Arc<Bridge<ReadyBackend, ControllerStore<InMemoryBackend>>>, Arc<ControllerStore<InMemoryBackend>>)
{
    let store = Arc::new(ControllerStore::new(InMemoryBackend::new()));
    let bridge = Arc::new(Bridge::new(
        BridgeConfig {
            default_chain_id: "SN_MAIN".into(),
        },
        Arc::new(ReadyBackend),
        Arc::clone(&store),
        Arc::new(NoopMetrics),
    ));
    (bridge, store)
}

fn connected(store: &ControllerStore<InMemoryBackend>) {
    store
        .set_active(&ControllerRecord {
            address: "0xacct".into(),
        })
        .unwrap();
    store
        .create(&Session {
            account_address: "0xacct".into(),
            origin: ORIGIN.into(),
            chain_id: "SN_MAIN".into(),
            policies: vec![Policy::new("0xgame", "attack")],
            max_fee: None,
        })
        .unwrap();
}

// ============================================================================
// SECTION: Origin Normalization Tests
// ============================================================================

#[test]
fn normalization_lowercases_and_strips_path_query_and_fragment() {
    let origin = normalize_origin("HTTPS://Game.Example/play?session=1#top").unwrap();
    assert_eq!(origin.as_str(), "https://game.example");
}

#[test]
fn normalization_keeps_an_explicit_non_default_port() {
    let origin = normalize_origin("https://game.example:8443/play").unwrap();
    assert_eq!(origin.as_str(), "https://game.example:8443");
}

#[test]
fn normalization_drops_the_default_port() {
    // The parser already folds scheme-default ports away.
    let origin = normalize_origin("https://game.example:443").unwrap();
    assert_eq!(origin.as_str(), "https://game.example");
}

#[test]
fn equivalent_raw_origins_normalize_identically() {
    let plain = normalize_origin("https://game.example").unwrap();
    let decorated = normalize_origin("HTTPS://GAME.EXAMPLE/deep/path").unwrap();
    assert_eq!(plain, decorated);
}

#[test]
fn unparseable_origins_are_rejected() {
    assert!(normalize_origin("not an origin").is_none());
    assert!(normalize_origin("").is_none());
    assert!(normalize_origin("data:text/plain,hello").is_none());
}

// ============================================================================
// SECTION: Wire Format Tests
// ============================================================================

#[test]
fn execute_decodes_from_the_tagged_wire_shape() {
    let wire = json!({
        "method": "execute",
        "params": {
            "calls": [
                {"target": "0xgame", "method": "attack", "calldata": ["0x1"]}
            ],
            "details": {"maxFee": 40},
            "sync": false
        }
    });
    let call: MethodCall = serde_json::from_value(wire).unwrap();
    let MethodCall::Execute {
        calls,
        details,
        sync,
    } = call
    else {
        panic!("decoded wrong variant");
    };
    assert_eq!(calls.len(), 1);
    assert_eq!(details.unwrap().max_fee, Some(FeeAmount::new(40)));
    assert!(!sync);
}

#[test]
fn optional_params_default_when_absent() {
    let wire = json!({
        "method": "connect",
        "params": {
            "policies": [{"target": "0xgame", "method": "attack"}]
        }
    });
    let call: MethodCall = serde_json::from_value(wire).unwrap();
    let MethodCall::Connect {
        policies,
        starter_pack_id,
        chain_id,
    } = call
    else {
        panic!("decoded wrong variant");
    };
    assert_eq!(policies, vec![Policy::new("0xgame", "attack")]);
    assert!(starter_pack_id.is_none());
    assert!(chain_id.is_none());
}

#[test]
fn parameterless_methods_decode_without_params() {
    for (wire, expected) in [
        (json!({"method": "probe"}), MethodCall::Probe),
        (json!({"method": "reset"}), MethodCall::Reset),
        (json!({"method": "logout"}), MethodCall::Logout),
        (json!({"method": "sessions"}), MethodCall::Sessions),
    ] {
        let call: MethodCall = serde_json::from_value(wire).unwrap();
        assert_eq!(call, expected);
    }
}

#[test]
fn unknown_methods_fail_decoding() {
    let wire = json!({"method": "transferEverything", "params": {}});
    assert!(serde_json::from_value::<MethodCall>(wire).is_err());
}

// ============================================================================
// SECTION: Channel Tests
// ============================================================================

#[tokio::test]
async fn channel_round_trips_a_probe() {
    let (bridge, store) = bridge();
    connected(&store);
    let channel = BridgeChannel::spawn(bridge);
    let response = channel.call(ORIGIN, MethodCall::Probe).await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.payload.unwrap()["address"], "0xacct");
    channel.destroy();
}

#[tokio::test]
async fn channel_replies_per_calling_origin() {
    let (bridge, store) = bridge();
    connected(&store);
    let channel = BridgeChannel::spawn(bridge);
    let known = channel.call(ORIGIN, MethodCall::Probe).await.unwrap();
    assert!(known.is_success());
    let unknown = channel.call("https://other.example", MethodCall::Probe).await.unwrap();
    assert_eq!(unknown.code, ResponseCode::NotConnected);
    assert_eq!(unknown.message.as_deref(), Some("Controller not connected."));
    channel.destroy();
}

#[tokio::test]
async fn channel_serves_a_long_run_of_sequential_calls() {
    let (bridge, store) = bridge();
    connected(&store);
    let channel = BridgeChannel::spawn(bridge);
    // Well past the inbox depth, so the loop must reap finished workers.
    for _ in 0..128 {
        let response = channel.call(ORIGIN, MethodCall::Probe).await.unwrap();
        assert!(response.is_success());
    }
    channel.destroy();
}

#[tokio::test]
async fn destroyed_channel_never_settles_callers() {
    let (bridge, store) = bridge();
    connected(&store);
    let channel = BridgeChannel::spawn(bridge);
    channel.destroy();
    // Let the serve loop observe the shutdown before calling.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(channel.call(ORIGIN, MethodCall::Probe).await, None);
}

#[tokio::test]
async fn destroy_is_idempotent() {
    let (bridge, _store) = bridge();
    let channel = BridgeChannel::spawn(bridge);
    channel.destroy();
    channel.destroy();
}
