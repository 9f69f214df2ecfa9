// crates/keychain-rpc/src/channel.rs
// ============================================================================
// Module: Bridge Channel
// Description: Async transport carrying origin-tagged calls to the bridge.
// Purpose: Decouple caller tasks from dispatch and support teardown.
// Dependencies: keychain-core, tokio, crate::bridge
// ============================================================================

//! ## Overview
//! The channel is the only way callers reach the bridge. Each inbound
//! request carries the raw transport origin alongside the call; the serve
//! loop hands every request to its own worker task so a long-lived
//! escalation never blocks later calls. Finished workers are reaped as the
//! loop runs; teardown aborts the rest, which releases their callers' reply
//! receivers without resolving them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use keychain_core::ControllerRegistry;
use keychain_core::ExecutionBackend;
use keychain_core::ResponseEnvelope;
use keychain_core::SessionStore;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinSet;

use crate::bridge::Bridge;
use crate::bridge::MethodCall;

// ============================================================================
// SECTION: Inbound Request
// ============================================================================

/// Bound on in-flight requests waiting for a worker.
const CHANNEL_DEPTH: usize = 32;

/// One caller request in flight on the channel.
///
/// # Invariants
/// - `origin` is the raw transport origin; normalization happens in the
///   bridge, never in callers.
/// - `reply` is dropped unsent when the request's escalation is superseded
///   or the channel is torn down, leaving the caller unsettled.
#[derive(Debug)]
pub struct InboundRequest {
    /// Raw transport origin tagging the call.
    pub origin: String,
    /// Method call to dispatch.
    pub call: MethodCall,
    /// Single-use reply slot for the caller.
    pub reply: oneshot::Sender<ResponseEnvelope>,
}

// ============================================================================
// SECTION: Bridge Channel
// ============================================================================

/// Handle to a running bridge serve loop.
///
/// # Invariants
/// - After [`BridgeChannel::destroy`] no further request is dispatched and
///   no pending reply is resolved.
#[derive(Debug)]
pub struct BridgeChannel {
    /// Sender feeding the serve loop.
    requests: mpsc::Sender<InboundRequest>,
    /// Single-use shutdown trigger for the serve loop.
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl BridgeChannel {
    /// Spawns the serve loop for a bridge and returns its channel handle.
    #[must_use]
    pub fn spawn<B, S>(bridge: Arc<Bridge<B, S>>) -> Self
    where
        B: ExecutionBackend + 'static,
        S: SessionStore + ControllerRegistry + Send + Sync + 'static,
    {
        let (requests, mut inbox) = mpsc::channel::<InboundRequest>(CHANNEL_DEPTH);
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let mut workers: JoinSet<()> = JoinSet::new();
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    inbound = inbox.recv() => {
                        let Some(request) = inbound else { break };
                        let bridge = Arc::clone(&bridge);
                        workers.spawn(async move {
                            let response =
                                bridge.dispatch(&request.origin, request.call).await;
                            if let Some(envelope) = response {
                                let _ = request.reply.send(envelope);
                            }
                        });
                    }
                    Some(_) = workers.join_next(), if !workers.is_empty() => {}
                }
            }
            workers.abort_all();
        });
        Self {
            requests,
            shutdown: Mutex::new(Some(shutdown)),
        }
    }

    /// Sends one call and waits for its reply.
    ///
    /// Returns `None` when the request never settles: the channel is torn
    /// down, or the call escalated and a newer escalation superseded it.
    pub async fn call(
        &self,
        origin: impl Into<String>,
        call: MethodCall,
    ) -> Option<ResponseEnvelope> {
        let (reply, receiver) = oneshot::channel();
        let request = InboundRequest {
            origin: origin.into(),
            call,
            reply,
        };
        self.requests.send(request).await.ok()?;
        receiver.await.ok()
    }

    /// Tears down the serve loop and aborts in-flight workers.
    ///
    /// Idempotent; later calls are no-ops.
    pub fn destroy(&self) {
        if let Ok(mut guard) = self.shutdown.lock()
            && let Some(trigger) = guard.take()
        {
            let _ = trigger.send(());
        }
    }
}
