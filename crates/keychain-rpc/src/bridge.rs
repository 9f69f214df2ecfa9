// crates/keychain-rpc/src/bridge.rs
// ============================================================================
// Module: RPC Bridge
// Description: Fixed method table dispatch with origin normalization.
// Purpose: Map inbound calls to gate flows and envelope every outcome.
// Dependencies: keychain-core, keychain-broker, keychain-store, serde, url
// ============================================================================

//! ## Overview
//! The bridge owns the caller-facing method table. Every inbound call is
//! tagged with the transport-supplied origin, which is normalized here
//! before any state is touched; a raw origin that fails to normalize is
//! refused without dispatch. Methods that act under an existing grant run
//! the validate pre-check (active controller, then session for the origin)
//! and fail closed with the exact refusal messages. Internal faults from
//! any collaborator degrade to a canceled envelope so the caller always
//! observes at most one envelope per call; a pending request superseded by
//! a newer escalation observes none.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use keychain_broker::PendingHandle;
use keychain_broker::RequestBroker;
use keychain_core::Call;
use keychain_core::ChainId;
use keychain_core::ContractAddress;
use keychain_core::ControllerRecord;
use keychain_core::ControllerRegistry;
use keychain_core::ExecuteDetails;
use keychain_core::ExecutionBackend;
use keychain_core::Origin;
use keychain_core::Policy;
use keychain_core::ProbeReply;
use keychain_core::ResponseEnvelope;
use keychain_core::Session;
use keychain_core::SessionStore;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::gate::ExecutionGate;
use crate::gate::GateError;
use crate::gate::GateOutcome;
use crate::telemetry::CallOutcome;
use crate::telemetry::MethodName;
use crate::telemetry::MetricsSink;

// ============================================================================
// SECTION: Origin Normalization
// ============================================================================

/// Normalizes a raw transport origin into its canonical form.
///
/// The canonical form is `scheme://host[:port]` with scheme and host
/// lowercased and path, query, and fragment dropped. The port is kept only
/// when explicitly present and non-default. Returns `None` when the raw
/// string is not a parseable origin; callers must refuse such requests.
#[must_use]
pub fn normalize_origin(raw: &str) -> Option<Origin> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let scheme = url.scheme().to_ascii_lowercase();
    let origin = match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    };
    Some(Origin::new(origin))
}

// ============================================================================
// SECTION: Method Table
// ============================================================================

/// Inbound call in the fixed method table.
///
/// # Invariants
/// - The variant set is exhaustive; unknown methods fail deserialization at
///   the transport boundary rather than reaching dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum MethodCall {
    /// Request or escalate a session grant.
    #[serde(rename_all = "camelCase")]
    Connect {
        /// Policies the caller requests.
        policies: Vec<Policy>,
        /// Optional starter pack to issue after approval.
        #[serde(default)]
        starter_pack_id: Option<String>,
        /// Optional chain switch accompanying the request.
        #[serde(default)]
        chain_id: Option<ChainId>,
    },
    /// Revoke the caller's session without confirmation.
    Disconnect,
    /// Submit a transaction batch under the session grant.
    #[serde(rename_all = "camelCase")]
    Execute {
        /// Calls in the batch.
        calls: Vec<Call>,
        /// Caller-supplied fee and nonce details.
        #[serde(default)]
        details: Option<ExecuteDetails>,
        /// Forces interactive confirmation when set.
        #[serde(default)]
        sync: bool,
    },
    /// Estimate the fee for an invoke batch.
    #[serde(rename_all = "camelCase")]
    EstimateInvokeFee {
        /// Calls in the batch.
        calls: Vec<Call>,
    },
    /// Estimate the fee for a declare payload.
    #[serde(rename_all = "camelCase")]
    EstimateDeclareFee {
        /// Opaque declare payload.
        payload: Value,
    },
    /// Sign a typed message after confirmation.
    #[serde(rename_all = "camelCase")]
    SignMessage {
        /// Typed payload to sign.
        typed_data: Value,
        /// Account the signature is requested for.
        account_address: ContractAddress,
    },
    /// Record a controller account and mark it active.
    #[serde(rename_all = "camelCase")]
    Provision {
        /// Account address to provision.
        address: ContractAddress,
    },
    /// Register this device's credential for the active controller.
    Register,
    /// Switch the active controller to a known account.
    #[serde(rename_all = "camelCase")]
    Login {
        /// Account address to activate.
        address: ContractAddress,
    },
    /// Destroy the caller's session after confirmation.
    Logout,
    /// Report the caller's current connection state.
    Probe,
    /// Revoke the session held by another origin.
    #[serde(rename_all = "camelCase")]
    Revoke {
        /// Raw origin whose session is revoked.
        origin: String,
    },
    /// Load the caller's session record.
    #[serde(rename_all = "camelCase")]
    Session {
        /// Optional chain override for the lookup.
        #[serde(default)]
        chain_id: Option<ChainId>,
    },
    /// List every session for the active controller.
    Sessions,
    /// Drop any pending request without settling it.
    Reset,
    /// Issue a starter pack after confirmation.
    #[serde(rename_all = "camelCase")]
    IssueStarterPack {
        /// Starter pack identifier.
        starter_pack_id: String,
    },
    /// Show quest state for a game after confirmation.
    #[serde(rename_all = "camelCase")]
    ShowQuests {
        /// Game identifier.
        game_id: String,
    },
}

impl MethodCall {
    /// Returns the telemetry label for the call.
    #[must_use]
    pub const fn method_name(&self) -> MethodName {
        match self {
            Self::Connect { .. } => MethodName::Connect,
            Self::Disconnect => MethodName::Disconnect,
            Self::Execute { .. } => MethodName::Execute,
            Self::EstimateInvokeFee { .. } => MethodName::EstimateInvokeFee,
            Self::EstimateDeclareFee { .. } => MethodName::EstimateDeclareFee,
            Self::SignMessage { .. } => MethodName::SignMessage,
            Self::Provision { .. } => MethodName::Provision,
            Self::Register => MethodName::Register,
            Self::Login { .. } => MethodName::Login,
            Self::Logout => MethodName::Logout,
            Self::Probe => MethodName::Probe,
            Self::Revoke { .. } => MethodName::Revoke,
            Self::Session { .. } => MethodName::Session,
            Self::Sessions => MethodName::Sessions,
            Self::Reset => MethodName::Reset,
            Self::IssueStarterPack { .. } => MethodName::IssueStarterPack,
            Self::ShowQuests { .. } => MethodName::ShowQuests,
        }
    }
}

// ============================================================================
// SECTION: Bridge Configuration
// ============================================================================

/// Bridge construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Chain scoping decisions until a connect switches it.
    pub default_chain_id: ChainId,
}

// ============================================================================
// SECTION: Bridge
// ============================================================================

/// Caller-facing dispatch over the execution gate.
///
/// # Invariants
/// - Every dispatched call yields at most one envelope; superseded pending
///   requests yield none.
/// - State is never touched before origin normalization succeeds.
pub struct Bridge<B, S> {
    /// Decision pipeline behind the method table.
    gate: ExecutionGate<B, S>,
    /// Session and controller record persistence.
    store: Arc<S>,
    /// Telemetry sink for dispatch counters.
    metrics: Arc<dyn MetricsSink>,
}

impl<B, S> Bridge<B, S>
where
    B: ExecutionBackend,
    S: SessionStore + ControllerRegistry + Send + Sync,
{
    /// Creates a bridge over its collaborators.
    pub fn new(
        config: BridgeConfig,
        backend: Arc<B>,
        store: Arc<S>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let broker = Arc::new(RequestBroker::new());
        let gate =
            ExecutionGate::new(backend, Arc::clone(&store), broker, config.default_chain_id);
        Self {
            gate,
            store,
            metrics,
        }
    }

    /// Returns the gate so the confirmation renderer can act on escalations.
    #[must_use]
    pub const fn gate(&self) -> &ExecutionGate<B, S> {
        &self.gate
    }

    /// Dispatches one inbound call tagged with its raw transport origin.
    ///
    /// Returns `None` only when an escalated request was superseded before
    /// resolution; the caller must then never settle.
    pub async fn dispatch(&self, raw_origin: &str, call: MethodCall) -> Option<ResponseEnvelope> {
        let method = call.method_name();
        let response = self.dispatch_inner(raw_origin, call).await;
        self.metrics.record_call(method, CallOutcome::from_response(response.as_ref()));
        response
    }

    /// Runs the method table after origin normalization.
    async fn dispatch_inner(&self, raw_origin: &str, call: MethodCall) -> Option<ResponseEnvelope> {
        let Some(origin) = normalize_origin(raw_origin) else {
            return Some(ResponseEnvelope::not_connected("Invalid origin."));
        };
        match call {
            MethodCall::Connect {
                policies,
                starter_pack_id,
                chain_id,
            } => {
                match self.gate.connect(&origin, policies, starter_pack_id, chain_id) {
                    Ok(outcome) => Self::settle(outcome).await,
                    Err(err) => Some(Self::fault(&err)),
                }
            }
            MethodCall::Disconnect => {
                let (controller, session) = match self.validate(&origin) {
                    Ok(pair) => pair,
                    Err(refusal) => return Some(refusal),
                };
                match self.store.revoke(&controller.address, &origin, &session.chain_id) {
                    Ok(()) => Some(ResponseEnvelope::success()),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Execute {
                calls,
                details,
                sync,
            } => {
                let (controller, session) = match self.validate(&origin) {
                    Ok(pair) => pair,
                    Err(refusal) => return Some(refusal),
                };
                match self.gate.execute(&origin, &controller, &session, calls, details, sync).await
                {
                    Ok(outcome) => Self::settle(outcome).await,
                    Err(err) => Some(Self::fault(&err)),
                }
            }
            MethodCall::EstimateInvokeFee {
                calls,
            } => {
                let (controller, _session) = match self.validate(&origin) {
                    Ok(pair) => pair,
                    Err(refusal) => return Some(refusal),
                };
                match self.gate.estimate_invoke_fee(&controller, &calls).await {
                    Ok(estimate) => Some(ResponseEnvelope::success_with(&estimate)),
                    Err(err) => Some(Self::fault(&err)),
                }
            }
            MethodCall::EstimateDeclareFee {
                payload,
            } => {
                let (controller, _session) = match self.validate(&origin) {
                    Ok(pair) => pair,
                    Err(refusal) => return Some(refusal),
                };
                match self.gate.estimate_declare_fee(&controller, &payload).await {
                    Ok(estimate) => Some(ResponseEnvelope::success_with(&estimate)),
                    Err(err) => Some(Self::fault(&err)),
                }
            }
            MethodCall::SignMessage {
                typed_data,
                account_address,
            } => {
                if let Err(refusal) = self.validate(&origin) {
                    return Some(refusal);
                }
                Self::wait(self.gate.sign_message(&origin, typed_data, account_address)).await
            }
            MethodCall::Provision {
                address,
            } => {
                let record = ControllerRecord {
                    address,
                };
                match self.store.set_active(&record) {
                    Ok(()) => Some(ResponseEnvelope::success_with(&record)),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Register => {
                let controller = match self.store.active() {
                    Ok(Some(controller)) => controller,
                    Ok(None) => {
                        return Some(ResponseEnvelope::not_connected("Controller not found."));
                    }
                    Err(err) => return Some(ResponseEnvelope::canceled(err.to_string())),
                };
                match self.gate.register_device(&controller).await {
                    Ok(()) => Some(ResponseEnvelope::success()),
                    Err(err) => Some(Self::fault(&err)),
                }
            }
            MethodCall::Login {
                address,
            } => {
                let record = ControllerRecord {
                    address,
                };
                match self.store.set_active(&record) {
                    Ok(()) => Some(ResponseEnvelope::success_with(&record)),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Logout => Self::wait(self.gate.logout(&origin)).await,
            MethodCall::Probe => {
                let (controller, session) = match self.validate(&origin) {
                    Ok(pair) => pair,
                    Err(refusal) => return Some(refusal),
                };
                let reply = ProbeReply {
                    address: controller.address,
                    policies: session.policies,
                };
                Some(ResponseEnvelope::success_with(&reply))
            }
            MethodCall::Revoke {
                origin: target,
            } => {
                let Some(target) = normalize_origin(&target) else {
                    return Some(ResponseEnvelope::not_connected("Invalid origin."));
                };
                let controller = match self.store.active() {
                    Ok(Some(controller)) => controller,
                    Ok(None) => {
                        return Some(ResponseEnvelope::not_connected("Controller not found."));
                    }
                    Err(err) => return Some(ResponseEnvelope::canceled(err.to_string())),
                };
                let chain = match self.gate.active_chain() {
                    Ok(chain) => chain,
                    Err(err) => return Some(Self::fault(&err)),
                };
                match self.store.revoke(&controller.address, &target, &chain) {
                    Ok(()) => Some(ResponseEnvelope::success()),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Session {
                chain_id,
            } => {
                let controller = match self.store.active() {
                    Ok(Some(controller)) => controller,
                    Ok(None) => {
                        return Some(ResponseEnvelope::not_connected("Controller not found."));
                    }
                    Err(err) => return Some(ResponseEnvelope::canceled(err.to_string())),
                };
                let chain = match chain_id {
                    Some(chain) => chain,
                    None => match self.gate.active_chain() {
                        Ok(chain) => chain,
                        Err(err) => return Some(Self::fault(&err)),
                    },
                };
                match self.store.get(&controller.address, &origin, &chain) {
                    Ok(session) => Some(ResponseEnvelope::success_with(&session)),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Sessions => {
                let controller = match self.store.active() {
                    Ok(Some(controller)) => controller,
                    Ok(None) => {
                        return Some(ResponseEnvelope::not_connected("Controller not found."));
                    }
                    Err(err) => return Some(ResponseEnvelope::canceled(err.to_string())),
                };
                match self.store.list_all(&controller.address) {
                    Ok(sessions) => Some(ResponseEnvelope::success_with(&sessions)),
                    Err(err) => Some(ResponseEnvelope::canceled(err.to_string())),
                }
            }
            MethodCall::Reset => {
                self.gate.reset();
                Some(ResponseEnvelope::success())
            }
            MethodCall::IssueStarterPack {
                starter_pack_id,
            } => Self::wait(self.gate.issue_starter_pack(&origin, starter_pack_id)).await,
            MethodCall::ShowQuests {
                game_id,
            } => Self::wait(self.gate.show_quests(&origin, game_id)).await,
        }
    }

    /// Runs the validate pre-check for session-scoped methods.
    ///
    /// Fails closed: a missing controller refuses before the session lookup,
    /// and a missing session refuses before any backend access.
    fn validate(&self, origin: &Origin) -> Result<(ControllerRecord, Session), ResponseEnvelope> {
        let controller = match self.store.active() {
            Ok(Some(controller)) => controller,
            Ok(None) => return Err(ResponseEnvelope::not_connected("Controller not found.")),
            Err(err) => return Err(ResponseEnvelope::canceled(err.to_string())),
        };
        let chain = self.gate.active_chain().map_err(|err| Self::fault(&err))?;
        match self.store.get(&controller.address, origin, &chain) {
            Ok(Some(session)) => Ok((controller, session)),
            Ok(None) => Err(ResponseEnvelope::not_connected("Controller not connected.")),
            Err(err) => Err(ResponseEnvelope::canceled(err.to_string())),
        }
    }

    /// Collapses a gate outcome into the caller's reply.
    async fn settle(outcome: GateOutcome) -> Option<ResponseEnvelope> {
        match outcome {
            GateOutcome::Respond(envelope) => Some(envelope),
            GateOutcome::Pending(handle) => Self::wait(handle).await,
        }
    }

    /// Awaits a pending handle, dropping the reply when superseded.
    async fn wait(handle: PendingHandle) -> Option<ResponseEnvelope> {
        handle.wait().await.ok()
    }

    /// Maps an internal fault to the caller-facing envelope.
    fn fault(err: &GateError) -> ResponseEnvelope {
        ResponseEnvelope::canceled(err.to_string())
    }
}
