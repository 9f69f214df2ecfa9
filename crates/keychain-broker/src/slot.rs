// crates/keychain-broker/src/slot.rs
// ============================================================================
// Module: Keychain Broker Slot
// Description: Single-slot register holding the pending request and responder.
// Purpose: Pair escalated requests with single-use deferred resolution.
// Dependencies: keychain-core, tokio
// ============================================================================

//! ## Overview
//! [`RequestBroker`] is an explicit single-slot register holding a tagged
//! pending-request description plus its resolution continuation. The
//! confirmation renderer reads the slot snapshot to decide which screen to
//! show and settles it exactly once per rendered screen. A newer escalation
//! overwrites the slot; the overwritten responder is dropped without being
//! invoked, which is the documented current behavior rather than a queue.
//!
//! Decisions that must suspend before settling (status queries, fee
//! estimation) first [`claim`](RequestBroker::claim) the occupant, removing
//! it from the slot together with its responder. A claimed decision can
//! only ever settle the request it was claimed for, even when a newer
//! escalation occupies the slot in the meantime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use keychain_core::PendingRequest;
use keychain_core::ResponseEnvelope;
use thiserror::Error;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Broker Errors
// ============================================================================

/// Errors returned by the request broker.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// No request occupies the slot.
    #[error("no pending request")]
    Empty,
    /// Slot occupant's action kind differs from the claimed kind.
    #[error("pending request is {actual}, expected {expected}")]
    Mismatch {
        /// Action kind the claim asked for.
        expected: &'static str,
        /// Action kind occupying the slot.
        actual: &'static str,
    },
    /// Slot mutex was poisoned.
    #[error("pending slot mutex poisoned")]
    Poisoned,
}

/// Marker returned when a handle's request was overwritten before resolution.
///
/// # Invariants
/// - A superseded handle never observes an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pending request superseded by a newer escalation")]
pub struct Superseded;

// ============================================================================
// SECTION: Pending Handle
// ============================================================================

/// Await-able handle for an escalated request.
///
/// # Invariants
/// - Settles with the envelope the human decision produced, or with
///   [`Superseded`] when a newer escalation overwrote the slot.
#[derive(Debug)]
pub struct PendingHandle {
    /// Receiver for the single-use responder.
    receiver: oneshot::Receiver<ResponseEnvelope>,
}

impl PendingHandle {
    /// Waits for the human decision on this request.
    ///
    /// # Errors
    ///
    /// Returns [`Superseded`] when the request was overwritten before it was
    /// resolved or rejected.
    pub async fn wait(self) -> Result<ResponseEnvelope, Superseded> {
        self.receiver.await.map_err(|_| Superseded)
    }
}

// ============================================================================
// SECTION: Claimed Request
// ============================================================================

/// Occupant removed from the slot together with its responder.
///
/// # Invariants
/// - Settling a claimed request delivers to the caller that escalated it,
///   never to whatever occupies the slot afterwards.
#[derive(Debug)]
pub struct ClaimedRequest {
    /// Escalated request description.
    request: PendingRequest,
    /// Captured single-use responder bound to the claimed caller's handle.
    responder: oneshot::Sender<ResponseEnvelope>,
}

impl ClaimedRequest {
    /// Returns the claimed request description.
    #[must_use]
    pub const fn request(&self) -> &PendingRequest {
        &self.request
    }

    /// Settles the claimed caller with the given envelope.
    ///
    /// Delivery to a caller that has gone away is not an error; the
    /// envelope is simply dropped.
    pub fn resolve(self, envelope: ResponseEnvelope) {
        let _ = self.responder.send(envelope);
    }
}

// ============================================================================
// SECTION: Request Broker
// ============================================================================

/// Slot contents pairing a request with its responder.
#[derive(Debug)]
struct ActiveRequest {
    /// Escalated request description.
    request: PendingRequest,
    /// Single-use responder bound to the caller's handle.
    responder: oneshot::Sender<ResponseEnvelope>,
}

/// Single-slot pending-request mailbox.
///
/// # Invariants
/// - At most one request occupies the slot at any time.
/// - Resolution and rejection clear the slot.
#[derive(Debug, Default)]
pub struct RequestBroker {
    /// The single pending slot.
    slot: Mutex<Option<ActiveRequest>>,
}

impl RequestBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stores a request in the slot, overwriting any prior occupant.
    ///
    /// The returned handle settles when the human decision arrives. The
    /// overwritten occupant's responder, if any, is dropped unused.
    #[must_use]
    pub fn submit(&self, request: PendingRequest) -> PendingHandle {
        let (responder, receiver) = oneshot::channel();
        let active = ActiveRequest {
            request,
            responder,
        };
        if let Ok(mut guard) = self.slot.lock() {
            *guard = Some(active);
        }
        PendingHandle {
            receiver,
        }
    }

    /// Returns a snapshot of the current slot occupant, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Poisoned`] when the slot mutex is poisoned.
    pub fn current(&self) -> Result<Option<PendingRequest>, BrokerError> {
        let guard = self.slot.lock().map_err(|_| BrokerError::Poisoned)?;
        Ok(guard.as_ref().map(|active| active.request.clone()))
    }

    /// Removes the slot occupant when its action kind matches.
    ///
    /// The occupant leaves the slot together with its responder under a
    /// single lock acquisition, so a decision that suspends after claiming
    /// cannot settle a newer escalation by mistake. A mismatched occupant
    /// stays in the slot untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Empty`] when no request occupies the slot and
    /// [`BrokerError::Mismatch`] when the occupant's action kind differs.
    pub fn claim(&self, kind: &'static str) -> Result<ClaimedRequest, BrokerError> {
        let mut guard = self.slot.lock().map_err(|_| BrokerError::Poisoned)?;
        let actual = match guard.as_ref() {
            None => return Err(BrokerError::Empty),
            Some(active) => active.request.action.kind(),
        };
        if actual != kind {
            return Err(BrokerError::Mismatch {
                expected: kind,
                actual,
            });
        }
        let Some(active) = guard.take() else {
            return Err(BrokerError::Empty);
        };
        Ok(ClaimedRequest {
            request: active.request,
            responder: active.responder,
        })
    }

    /// Resolves whatever occupies the slot with the given envelope.
    ///
    /// Clears the slot. Delivery to a caller that has gone away is not an
    /// error; the envelope is simply dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Empty`] when no request occupies the slot.
    pub fn resolve_current(&self, envelope: ResponseEnvelope) -> Result<(), BrokerError> {
        let active = self
            .slot
            .lock()
            .map_err(|_| BrokerError::Poisoned)?
            .take()
            .ok_or(BrokerError::Empty)?;
        let _ = active.responder.send(envelope);
        Ok(())
    }

    /// Rejects whatever occupies the slot with a canceled envelope.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Empty`] when no request occupies the slot.
    pub fn reject_current(&self, reason: impl Into<String>) -> Result<(), BrokerError> {
        self.resolve_current(ResponseEnvelope::canceled(reason))
    }

    /// Drops the slot occupant without resolving it.
    ///
    /// The occupant's handle observes [`Superseded`].
    pub fn clear(&self) {
        if let Ok(mut guard) = self.slot.lock() {
            *guard = None;
        }
    }
}
