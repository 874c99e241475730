//! # Fire-and-forget fan-out of one event to its listeners.
//!
//! [`Dispatcher`] starts one task per matched listener and returns without awaiting any of them.
//!
//! ## Architecture
//! ```text
//! dispatch(event, [L1, L2, ... LN])
//!     │
//!     ├──► spawn ──► [permit?] ──► L1.handler.handle(&event)
//!     │                                 └──► Err / panic → log + FailureFeed
//!     ├──► spawn ──► [permit?] ──► L2.handler.handle(&event)
//!     └──► spawn ──► [permit?] ──► LN.handler.handle(&event)
//! ```
//!
//! ## Rules
//! - **No ordering** between invocations of one emission, nor across emissions.
//! - **Non-blocking**: `dispatch()` only spawns; permits are awaited inside each task.
//! - **Isolation**: an error or panic ends only its own invocation.
//! - **Tracking**: every invocation is spawned through a [`TaskTracker`] so shutdown can drain them.
//! - **Gated close**: the closed check and the spawns of one dispatch happen under a read gate;
//!   `close()` takes it for writing, so once it returns every accepted invocation is tracked.
//!
//! ## Panic handling
//! Invocations use `catch_unwind` to isolate panics:
//! - Panic is caught and converted to a [`HandlerFailure`] with [`FailureKind::Panic`](crate::FailureKind::Panic)
//! - Sibling invocations are unaffected
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

use crate::error::BusError;
use crate::events::{Event, FailureFeed, HandlerFailure};
use crate::listeners::Listener;

/// Spawns and tracks handler invocations.
pub(crate) struct Dispatcher {
    runtime: Option<Handle>,
    tracker: TaskTracker,
    /// Held shared by `dispatch`, exclusively by `close`.
    gate: RwLock<()>,
    limiter: Option<Arc<Semaphore>>,
    feed: FailureFeed,
}

impl Dispatcher {
    pub(crate) fn new(
        runtime: Option<Handle>,
        limiter: Option<Arc<Semaphore>>,
        feed: FailureFeed,
    ) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
            gate: RwLock::new(()),
            limiter,
            feed,
        }
    }

    /// Starts one invocation per listener; returns how many were started.
    ///
    /// Fails without starting anything if the bus is closed or no runtime is reachable.
    pub(crate) fn dispatch(
        &self,
        event: Event,
        listeners: Vec<Listener>,
    ) -> Result<usize, BusError> {
        let _open = self.gate.read();
        if self.tracker.is_closed() {
            return Err(BusError::Closed {
                event: event.name().to_owned(),
            });
        }
        if listeners.is_empty() {
            return Ok(0);
        }

        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| BusError::NoRuntime {
                event: event.name().to_owned(),
            })?,
        };

        let started = listeners.len();
        for listener in listeners {
            let invocation = invoke(
                listener,
                event.clone(),
                self.limiter.clone(),
                self.feed.clone(),
            );
            self.tracker.spawn_on(invocation, &runtime);
        }
        Ok(started)
    }

    /// Invocations started and not yet finished.
    pub(crate) fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stops accepting new dispatches. Returns `false` if already closed.
    ///
    /// Waits for dispatches already past the closed check to finish spawning.
    pub(crate) fn close(&self) -> bool {
        let _closing = self.gate.write();
        self.tracker.close()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Resolves once the dispatcher is closed and every invocation has finished.
    pub(crate) async fn drained(&self) {
        self.tracker.wait().await;
    }
}

/// Runs one handler invocation to completion, containing any failure.
async fn invoke(
    listener: Listener,
    event: Event,
    limiter: Option<Arc<Semaphore>>,
    feed: FailureFeed,
) {
    // the bus never closes the semaphore
    let _permit = match limiter {
        Some(sem) => sem.acquire_owned().await.ok(),
        None => None,
    };

    let handler = listener.handler();
    let outcome = AssertUnwindSafe(handler.handle(&event)).catch_unwind().await;

    match outcome {
        Ok(Ok(())) => {
            tracing::trace!(
                event = event.name(),
                seq = event.seq(),
                listener = %listener.id(),
                "handler finished"
            );
        }
        Ok(Err(err)) => {
            tracing::warn!(
                event = event.name(),
                seq = event.seq(),
                listener = %listener.id(),
                handler = handler.name(),
                error = %err,
                label = err.as_label(),
                "handler failed"
            );
            feed.publish(HandlerFailure::errored(
                listener.id(),
                handler.name(),
                event.name(),
                event.seq(),
                &err,
            ));
        }
        Err(panic_err) => {
            let info = panic_message(&*panic_err);
            tracing::error!(
                event = event.name(),
                seq = event.seq(),
                listener = %listener.id(),
                handler = handler.name(),
                panic = %info,
                "handler panicked"
            );
            feed.publish(HandlerFailure::panicked(
                listener.id(),
                handler.name(),
                event.name(),
                event.seq(),
                info,
            ));
        }
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::events::FailureKind;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    fn dispatcher(limit: Option<usize>) -> (Dispatcher, FailureFeed) {
        let feed = FailureFeed::new(16);
        let limiter = limit.map(Semaphore::new).map(Arc::new);
        (Dispatcher::new(None, limiter, feed.clone()), feed)
    }

    #[tokio::test]
    async fn test_dispatch_starts_one_invocation_per_listener() {
        let (d, _) = dispatcher(None);
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let listeners: Vec<Listener> = (0..3)
            .map(|_| {
                let tx = tx.clone();
                Listener::from_fn("ping", move |ev: &Event| {
                    let _ = tx.send(ev.seq());
                })
            })
            .collect();

        let started = d
            .dispatch(Event::new("ping", ()).with_seq(9), listeners)
            .unwrap();
        assert_eq!(started, 3);

        for _ in 0..3 {
            let seq = timeout(WAIT, rx.recv()).await.unwrap();
            assert_eq!(seq, Some(9));
        }
    }

    #[tokio::test]
    async fn test_empty_listener_set_is_noop() {
        let (d, _) = dispatcher(None);
        assert_eq!(d.dispatch(Event::new("none", ()), Vec::new()), Ok(0));
        assert_eq!(d.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_error_and_panic_reach_feed() {
        let (d, feed) = dispatcher(None);
        let mut failures = feed.subscribe();

        let failing = Listener::from_async("e", |_ev: Event| async {
            Err::<(), _>(HandlerError::failed("nope"))
        });
        let panicking = Listener::from_fn("e", |_ev: &Event| panic!("kaboom"));
        d.dispatch(Event::new("e", ()), vec![failing.clone(), panicking.clone()])
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(timeout(WAIT, failures.recv()).await.unwrap().unwrap());
        }
        seen.sort_by_key(|f| f.listener);

        assert_eq!(seen[0].listener, failing.id());
        assert_eq!(seen[0].kind, FailureKind::Error);
        assert_eq!(seen[0].reason.as_ref(), "handler failed: nope");
        assert_eq!(seen[1].listener, panicking.id());
        assert_eq!(seen[1].kind, FailureKind::Panic);
        assert_eq!(seen[1].reason.as_ref(), "kaboom");
        assert!(!seen[0].is_panic());
        assert!(seen[1].is_panic());
    }

    #[tokio::test]
    async fn test_closed_dispatcher_rejects() {
        let (d, _) = dispatcher(None);
        assert!(d.close());
        assert!(!d.close());
        let late = Listener::from_fn("late", |_ev: &Event| {});
        let err = d.dispatch(Event::new("late", ()), vec![late]).unwrap_err();
        assert_eq!(err, BusError::Closed { event: "late".into() });
    }

    #[test]
    fn test_no_runtime_is_reported() {
        let (d, _) = dispatcher(None);
        let l = Listener::from_fn("e", |_ev: &Event| {});
        let err = d.dispatch(Event::new("e", ()), vec![l]).unwrap_err();
        assert_eq!(err, BusError::NoRuntime { event: "e".into() });
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
