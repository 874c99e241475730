//! # Failure feed: broadcast of handler failures.
//!
//! [`FailureFeed`] is a thin wrapper around [`tokio::sync::broadcast`] that lets any
//! number of observers watch handler failures without giving the emitter a return channel.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                          Receivers (any):
//!   invocation 1 ──┐
//!   invocation 2 ──┼──► FailureFeed ──► (broadcast chan) ──► EventBus::failures()
//!   invocation N ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: one ring buffer stores the most recent records for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest records.
//! - **No persistence**: records are lost if there are no receivers at send time.

use tokio::sync::broadcast;

use super::failure::HandlerFailure;

/// Broadcast channel for handler failures.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct FailureFeed {
    tx: broadcast::Sender<HandlerFailure>,
}

impl FailureFeed {
    /// Creates a new feed with the given capacity (clamped to a minimum of 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<HandlerFailure>(capacity);
        Self { tx }
    }

    /// Publishes a failure to all active receivers.
    ///
    /// If there are no receivers, the record is dropped.
    pub fn publish(&self, failure: HandlerFailure) {
        let _ = self.tx.send(failure);
    }

    /// Creates a new receiver that observes failures published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<HandlerFailure> {
        self.tx.subscribe()
    }
}
