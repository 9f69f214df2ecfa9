// crates/keychain-rpc/src/lib.rs
// ============================================================================
// Module: Keychain RPC Library
// Description: RPC bridge, execution gate runtime, and channel transport.
// Purpose: Expose the fixed method surface to callers over an async channel.
// Dependencies: keychain-core, keychain-broker, keychain-store, tokio, url
// ============================================================================

//! ## Overview
//! Keychain RPC wires the session store, policy differ, account state
//! supervisor, and pending-request broker into an execution gate, and
//! exposes the fixed method table to callers across an asynchronous,
//! origin-aware channel. Origins are normalized by the channel layer;
//! caller-supplied origin strings are never trusted. Every failure path
//! returns a [`keychain_core::ResponseEnvelope`] rather than an error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bridge;
pub mod channel;
pub mod gate;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bridge::Bridge;
pub use bridge::BridgeConfig;
pub use bridge::MethodCall;
pub use bridge::normalize_origin;
pub use channel::BridgeChannel;
pub use channel::InboundRequest;
pub use gate::ExecutionGate;
pub use gate::GateError;
pub use gate::GateOutcome;
pub use telemetry::CallOutcome;
pub use telemetry::MethodName;
pub use telemetry::MetricsSink;
pub use telemetry::NoopMetrics;
