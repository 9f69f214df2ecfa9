// crates/keychain-rpc/src/gate.rs
// ============================================================================
// Module: Execution Gate
// Description: Orchestrates gate decisions across store, backend, and broker.
// Purpose: Sequence connect, execute, and approval flows around escalation.
// Dependencies: keychain-core, keychain-broker, thiserror
// ============================================================================

//! ## Overview
//! [`ExecutionGate`] composes the session store, the execution backend, and
//! the pending-request broker into the decision pipeline behind every
//! caller-facing method. Caller-side methods return [`GateOutcome`]: either a
//! final envelope or a pending handle that settles when the human decides.
//! The approval surface is invoked by the confirmation renderer against the
//! broker's current slot occupant and settles exactly one handle per call.
//! Kind-checked approvals claim the occupant before suspending, so a
//! decision always settles the request it was made for even when a newer
//! escalation overwrites the slot mid-flight.
//!
//! Live account status is re-queried from the backend at every decision
//! point; the deployment record in the store is a bookkeeping hint only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use keychain_broker::BrokerError;
use keychain_broker::PendingHandle;
use keychain_broker::RequestBroker;
use keychain_core::AccountStatus;
use keychain_core::AdminRecord;
use keychain_core::BackendError;
use keychain_core::Call;
use keychain_core::ChainId;
use keychain_core::ConnectDecision;
use keychain_core::ConnectReply;
use keychain_core::ContractAddress;
use keychain_core::ControllerRecord;
use keychain_core::ControllerRegistry;
use keychain_core::DeploymentRecord;
use keychain_core::ExecuteDetails;
use keychain_core::ExecuteReply;
use keychain_core::ExecutionBackend;
use keychain_core::FeeAmount;
use keychain_core::FeeEstimate;
use keychain_core::NextAction;
use keychain_core::Origin;
use keychain_core::PendingAction;
use keychain_core::PendingRequest;
use keychain_core::Policy;
use keychain_core::ResponseEnvelope;
use keychain_core::Session;
use keychain_core::SessionStore;
use keychain_core::StoreError;
use keychain_core::check_execution_status;
use keychain_core::check_fee_ceiling;
use keychain_core::check_policy_gap;
use keychain_core::connect_decision;
use keychain_core::required_policies;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Gate Errors
// ============================================================================

/// Internal faults raised by the gate orchestrator.
///
/// These never cross the caller boundary; the bridge maps each one to a
/// response envelope before replying.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum GateError {
    /// An approval requires an active controller and none is loaded.
    #[error("no active controller")]
    ControllerMissing,
    /// Active-chain mutex was poisoned.
    #[error("active chain mutex poisoned")]
    Poisoned,
    /// Session store fault.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Execution backend fault.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Pending-request broker fault.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

// ============================================================================
// SECTION: Gate Outcome
// ============================================================================

/// Result of a caller-side gate method.
#[derive(Debug)]
pub enum GateOutcome {
    /// The request settled without human involvement.
    Respond(ResponseEnvelope),
    /// The request was escalated; the handle settles on human decision.
    Pending(PendingHandle),
}

// ============================================================================
// SECTION: Execution Gate
// ============================================================================

/// Decision pipeline between the caller surface and the account.
///
/// # Invariants
/// - Account status is queried live per decision, never read from the
///   deployment record.
/// - Session mutation happens only on approval paths, never on refusal.
pub struct ExecutionGate<B, S> {
    /// External execution environment.
    backend: Arc<B>,
    /// Session and controller record persistence.
    store: Arc<S>,
    /// Single-slot pending-request mailbox.
    broker: Arc<RequestBroker>,
    /// Chain currently scoping gate decisions.
    chain: Mutex<ChainId>,
}

impl<B, S> ExecutionGate<B, S>
where
    B: ExecutionBackend,
    S: SessionStore + ControllerRegistry + Send + Sync,
{
    /// Creates a gate over its collaborators, scoped to a starting chain.
    pub fn new(backend: Arc<B>, store: Arc<S>, broker: Arc<RequestBroker>, chain: ChainId) -> Self {
        Self {
            backend,
            store,
            broker,
            chain: Mutex::new(chain),
        }
    }

    /// Returns the broker so a renderer can snapshot the pending slot.
    #[must_use]
    pub fn broker(&self) -> &RequestBroker {
        self.broker.as_ref()
    }

    /// Switches the chain scoping subsequent decisions.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Poisoned`] when the chain mutex is poisoned.
    pub fn set_chain(&self, chain_id: ChainId) -> Result<(), GateError> {
        let mut guard = self.chain.lock().map_err(|_| GateError::Poisoned)?;
        *guard = chain_id;
        Ok(())
    }

    /// Returns the chain currently scoping decisions.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Poisoned`] when the chain mutex is poisoned.
    pub fn active_chain(&self) -> Result<ChainId, GateError> {
        let guard = self.chain.lock().map_err(|_| GateError::Poisoned)?;
        Ok(guard.clone())
    }

    // ------------------------------------------------------------------
    // Caller-side methods
    // ------------------------------------------------------------------

    /// Handles a connect request from an origin.
    ///
    /// Auto-resolves when an existing session for the `(account, origin,
    /// chain)` key already grants every requested policy; otherwise escalates
    /// a connect prompt to the broker.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] on store or chain faults.
    pub fn connect(
        &self,
        origin: &Origin,
        policies: Vec<Policy>,
        starter_pack_id: Option<String>,
        chain_id: Option<ChainId>,
    ) -> Result<GateOutcome, GateError> {
        if let Some(chain_id) = chain_id {
            self.set_chain(chain_id)?;
        }
        let chain = self.active_chain()?;
        if let Some(controller) = self.store.active()?
            && let Some(session) = self.store.get(&controller.address, origin, &chain)?
            && connect_decision(Some(&session), &policies) == ConnectDecision::Covered
        {
            let reply = ConnectReply {
                address: controller.address,
                policies: session.policies,
            };
            return Ok(GateOutcome::Respond(ResponseEnvelope::success_with(&reply)));
        }
        let handle = self.broker.submit(PendingRequest {
            origin: origin.clone(),
            action: PendingAction::Connect {
                policies,
                starter_pack_id,
            },
        });
        Ok(GateOutcome::Pending(handle))
    }

    /// Handles an execute request from a validated origin.
    ///
    /// The `sync` flag forces escalation regardless of session coverage.
    /// Otherwise the auto path runs status, policy-gap, and fee-ceiling
    /// checks in order and submits the batch on pass.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] on backend or chain faults.
    pub async fn execute(
        &self,
        origin: &Origin,
        controller: &ControllerRecord,
        session: &Session,
        calls: Vec<Call>,
        details: Option<ExecuteDetails>,
        sync: bool,
    ) -> Result<GateOutcome, GateError> {
        if sync {
            let handle = self.broker.submit(PendingRequest {
                origin: origin.clone(),
                action: PendingAction::Execute {
                    calls,
                    details,
                },
            });
            return Ok(GateOutcome::Pending(handle));
        }
        let chain = match details.as_ref().and_then(|details| details.chain_id.clone()) {
            Some(chain) => chain,
            None => self.active_chain()?,
        };
        let status = self.backend.account_status(&controller.address, &chain).await?;
        if let Some(refusal) = check_execution_status(status) {
            return Ok(GateOutcome::Respond(refusal));
        }
        let required = required_policies(&calls);
        if let Some(refusal) = check_policy_gap(&required, &session.policies) {
            return Ok(GateOutcome::Respond(refusal));
        }
        let effective = match details.as_ref().and_then(|details| details.max_fee) {
            Some(fee) => fee,
            None => {
                self.backend
                    .estimate_invoke_fee(&controller.address, &chain, &calls)
                    .await?
                    .suggested_max_fee
            }
        };
        if let Some(refusal) = check_fee_ceiling(effective, session.max_fee) {
            return Ok(GateOutcome::Respond(refusal));
        }
        let receipt = self.backend.execute(&controller.address, &chain, &calls, effective).await?;
        let reply = ExecuteReply {
            transaction_hash: receipt.transaction_hash,
        };
        Ok(GateOutcome::Respond(ResponseEnvelope::success_with(&reply)))
    }

    /// Escalates a typed-message signing prompt.
    #[must_use]
    pub fn sign_message(
        &self,
        origin: &Origin,
        typed_data: Value,
        account_address: ContractAddress,
    ) -> PendingHandle {
        self.broker.submit(PendingRequest {
            origin: origin.clone(),
            action: PendingAction::SignMessage {
                typed_data,
                account_address,
            },
        })
    }

    /// Escalates a logout confirmation prompt.
    #[must_use]
    pub fn logout(&self, origin: &Origin) -> PendingHandle {
        self.broker.submit(PendingRequest {
            origin: origin.clone(),
            action: PendingAction::Logout,
        })
    }

    /// Escalates a starter-pack issuance prompt.
    #[must_use]
    pub fn issue_starter_pack(&self, origin: &Origin, starter_pack_id: String) -> PendingHandle {
        self.broker.submit(PendingRequest {
            origin: origin.clone(),
            action: PendingAction::StarterPack {
                starter_pack_id,
            },
        })
    }

    /// Escalates a quest display prompt.
    #[must_use]
    pub fn show_quests(&self, origin: &Origin, game_id: String) -> PendingHandle {
        self.broker.submit(PendingRequest {
            origin: origin.clone(),
            action: PendingAction::Quests {
                game_id,
            },
        })
    }

    /// Estimates the fee for an invoke batch on the active chain.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] on backend or chain faults.
    pub async fn estimate_invoke_fee(
        &self,
        controller: &ControllerRecord,
        calls: &[Call],
    ) -> Result<FeeEstimate, GateError> {
        let chain = self.active_chain()?;
        Ok(self.backend.estimate_invoke_fee(&controller.address, &chain, calls).await?)
    }

    /// Estimates the fee for a declare payload on the active chain.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] on backend or chain faults.
    pub async fn estimate_declare_fee(
        &self,
        controller: &ControllerRecord,
        payload: &Value,
    ) -> Result<FeeEstimate, GateError> {
        let chain = self.active_chain()?;
        Ok(self.backend.estimate_declare_fee(&controller.address, &chain, payload).await?)
    }

    /// Registers this device's credential for the active controller.
    ///
    /// Records the in-flight status so later decisions see `registering`
    /// bookkeeping even before the chain confirms.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] on backend, store, or chain faults.
    pub async fn register_device(&self, controller: &ControllerRecord) -> Result<(), GateError> {
        let chain = self.active_chain()?;
        self.backend.register(&controller.address, &chain).await?;
        self.store.put_deployment(&DeploymentRecord {
            address: controller.address.clone(),
            chain_id: chain,
            status: AccountStatus::Registering,
        })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Approval surface
    // ------------------------------------------------------------------

    /// Returns a snapshot of the pending request, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the broker slot is poisoned.
    pub fn current(&self) -> Result<Option<PendingRequest>, GateError> {
        Ok(self.broker.current()?)
    }

    /// Ensures this device can sign for the account, registering if needed.
    ///
    /// Returns `false` when registration fails; the approval caller must
    /// settle its claimed request as canceled and stop without mutating
    /// session state.
    async fn ensure_registered(
        &self,
        address: &ContractAddress,
        chain: &ChainId,
    ) -> Result<bool, GateError> {
        let status = self.backend.account_status(address, chain).await?;
        if status.next_action() != NextAction::RegisterDevice {
            return Ok(true);
        }
        if self.backend.register(address, chain).await.is_err() {
            return Ok(false);
        }
        self.store.put_deployment(&DeploymentRecord {
            address: address.clone(),
            chain_id: chain.clone(),
            status: AccountStatus::Registering,
        })?;
        Ok(true)
    }

    /// Approves the pending connect request with the owner's final grant.
    ///
    /// Claims the connect out of the broker slot first, then creates the
    /// session with exactly the approved policies and ceiling, records the
    /// origin as approved, and settles the claimed caller's handle.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when no connect request is pending, no
    /// controller is active, or a collaborator faults.
    pub async fn approve_connect(
        &self,
        policies: Vec<Policy>,
        max_fee: Option<FeeAmount>,
    ) -> Result<(), GateError> {
        let claimed = self.broker.claim("connect")?;
        let origin = claimed.request().origin.clone();
        let controller = self.store.active()?.ok_or(GateError::ControllerMissing)?;
        let chain = self.active_chain()?;
        if !self.ensure_registered(&controller.address, &chain).await? {
            claimed.resolve(ResponseEnvelope::canceled("Canceled"));
            return Ok(());
        }
        self.store.create(&Session {
            account_address: controller.address.clone(),
            origin: origin.clone(),
            chain_id: chain,
            policies: policies.clone(),
            max_fee,
        })?;
        self.store.put_admin(&AdminRecord {
            address: controller.address.clone(),
            origin,
        })?;
        let reply = ConnectReply {
            address: controller.address,
            policies,
        };
        claimed.resolve(ResponseEnvelope::success_with(&reply));
        Ok(())
    }

    /// Approves the pending execute request after human confirmation.
    ///
    /// Fee precedence: explicit override, then the details the caller
    /// supplied, then a fresh estimate. Backend failures on this path settle
    /// the handle with a canceled envelope rather than an internal error.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when no execute request is pending, no
    /// controller is active, or a store fault occurs.
    pub async fn approve_execute(&self, fee_override: Option<FeeAmount>) -> Result<(), GateError> {
        let claimed = self.broker.claim("execute")?;
        let (calls, details) = match &claimed.request().action {
            PendingAction::Execute {
                calls,
                details,
            } => (calls.clone(), details.clone()),
            other => {
                return Err(GateError::Broker(BrokerError::Mismatch {
                    expected: "execute",
                    actual: other.kind(),
                }));
            }
        };
        let controller = self.store.active()?.ok_or(GateError::ControllerMissing)?;
        let chain = match details.as_ref().and_then(|details| details.chain_id.clone()) {
            Some(chain) => chain,
            None => self.active_chain()?,
        };
        if !self.ensure_registered(&controller.address, &chain).await? {
            claimed.resolve(ResponseEnvelope::canceled("Canceled"));
            return Ok(());
        }
        let supplied =
            fee_override.or_else(|| details.as_ref().and_then(|details| details.max_fee));
        let fee = match supplied {
            Some(fee) => fee,
            None => {
                match self.backend.estimate_invoke_fee(&controller.address, &chain, &calls).await {
                    Ok(estimate) => estimate.suggested_max_fee,
                    Err(_) => {
                        claimed.resolve(ResponseEnvelope::canceled("Canceled"));
                        return Ok(());
                    }
                }
            }
        };
        match self.backend.execute(&controller.address, &chain, &calls, fee).await {
            Ok(receipt) => {
                let reply = ExecuteReply {
                    transaction_hash: receipt.transaction_hash,
                };
                claimed.resolve(ResponseEnvelope::success_with(&reply));
            }
            Err(_) => {
                claimed.resolve(ResponseEnvelope::canceled("Canceled"));
            }
        }
        Ok(())
    }

    /// Confirms the pending logout, revoking the origin's session.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when no logout request is pending or a
    /// collaborator faults.
    pub fn confirm_logout(&self) -> Result<(), GateError> {
        let claimed = self.broker.claim("logout")?;
        if let Some(controller) = self.store.active()? {
            let chain = self.active_chain()?;
            self.store.revoke(&controller.address, &claimed.request().origin, &chain)?;
        }
        claimed.resolve(ResponseEnvelope::not_connected("User logged out"));
        Ok(())
    }

    /// Declines the pending logout, leaving the session intact.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when no logout request is pending.
    pub fn cancel_logout(&self) -> Result<(), GateError> {
        let claimed = self.broker.claim("logout")?;
        claimed.resolve(ResponseEnvelope::canceled("User cancelled logout"));
        Ok(())
    }

    /// Refuses whatever request is pending with the generic reason.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the slot is empty.
    pub fn cancel_current(&self) -> Result<(), GateError> {
        self.broker.reject_current("Canceled")?;
        Ok(())
    }

    /// Settles the pending request with an externally produced envelope.
    ///
    /// Used by renderer flows whose payload the gate does not construct,
    /// such as signed typed messages and issued starter packs.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the slot is empty.
    pub fn resolve_current(&self, envelope: ResponseEnvelope) -> Result<(), GateError> {
        self.broker.resolve_current(envelope)?;
        Ok(())
    }

    /// Drops any pending request without settling it.
    pub fn reset(&self) {
        self.broker.clear();
    }
}
