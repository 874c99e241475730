//! # EventBus: listener registry plus concurrent fire-and-forget dispatch.
//!
//! The [`EventBus`] owns the listener registry, the dispatcher, and the failure feed.
//! It is a cheap-to-clone handle; clones share one registry.
//!
//! ## High-level architecture
//! ```text
//! register(&L) / unregister(&L) / clear(name)
//!        │
//!        ▼
//!   Registry (single mutex) ◄──── listener_count / event_names
//!        │
//!        │ snapshot(name)          (lock held only for the copy)
//!        ▼
//! emit(name, payload) ──► Event{name, payload, seq, at}
//!        │
//!        └──► Dispatcher::dispatch ──► one task per listener ──► handler.handle(&Event)
//!                                                     └──► failures ──► FailureFeed
//!
//! Shutdown path:
//!   shutdown() ──► close dispatcher (later emits → BusError::Closed)
//!              └─► wait up to cfg.grace for running invocations
//!                     ├─ drained  → Ok(())
//!                     └─ timeout  → BusError::GraceExceeded
//! ```
//!
//! ## Example
//! ```rust
//! use busline::{Event, EventBus, Listener};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new();
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let listener = Listener::from_fn("call:event", move |ev: &Event| {
//!         let _ = tx.send(ev.payload::<&str>().copied());
//!     });
//!     bus.register(&listener);
//!
//!     bus.emit("call:event", "payload-X")?;
//!     assert_eq!(rx.recv().await, Some(Some("payload-X")));
//!
//!     bus.unregister(&listener);
//!     assert_eq!(bus.listener_count("call:event"), 0);
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use super::{builder::EventBusBuilder, dispatch::Dispatcher, registry::Registry};
use crate::{
    config::BusConfig,
    error::BusError,
    events::{Event, FailureFeed, HandlerFailure, Payload},
    listeners::{Listener, ListenerId},
};

struct Inner {
    cfg: BusConfig,
    registry: Registry,
    dispatcher: Dispatcher,
    feed: FailureFeed,
    /// Last assigned emission sequence number.
    seq: AtomicU64,
}

/// In-process publish/subscribe bus.
///
/// ### Properties
/// - **Thread-safe**: every method takes `&self`; registry access is serialized by one lock.
/// - **Fire-and-forget**: `emit` spawns one task per matched listener and returns.
/// - **Isolated**: handler errors and panics never reach the emitter or sibling handlers.
/// - **Cloneable**: clones share the same registry and dispatcher.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Creates a bus with [`BusConfig::default`].
    pub fn new() -> Self {
        Self::builder(BusConfig::default()).build()
    }

    /// Returns a builder for a bus with the given configuration.
    pub fn builder(cfg: BusConfig) -> EventBusBuilder {
        EventBusBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: BusConfig,
        registry: Registry,
        dispatcher: Dispatcher,
        feed: FailureFeed,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                registry,
                dispatcher,
                feed,
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.inner.cfg
    }

    // ---------------------------
    // Registry
    // ---------------------------

    /// Appends `listener` to the sequence for its event name.
    ///
    /// The bus keeps a clone of the handle; the caller keeps theirs for [`unregister`](Self::unregister).
    /// Registering the same listener twice makes it run twice per emission.
    pub fn register(&self, listener: &Listener) -> ListenerId {
        let count = self.inner.registry.register(listener.clone());
        tracing::debug!(
            event = listener.event_name(),
            listener = %listener.id(),
            listeners = count,
            "listener registered"
        );
        listener.id()
    }

    /// Removes every registration of `listener` (matched by identity).
    ///
    /// Returns how many entries were removed; `0` means it was not registered.
    pub fn unregister(&self, listener: &Listener) -> usize {
        let removed = self.inner.registry.unregister(listener);
        if removed > 0 {
            tracing::debug!(
                event = listener.event_name(),
                listener = %listener.id(),
                removed,
                "listener unregistered"
            );
        }
        removed
    }

    /// Removes all listeners for `event_name`. Returns how many were dropped.
    pub fn clear(&self, event_name: &str) -> usize {
        let dropped = self.inner.registry.clear(event_name);
        if dropped > 0 {
            tracing::debug!(event = event_name, dropped, "listeners cleared");
        }
        dropped
    }

    /// Number of listeners registered for `event_name` (0 if none).
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.inner.registry.count(event_name)
    }

    /// Event names with at least one listener, in unspecified order.
    pub fn event_names(&self) -> Vec<String> {
        self.inner.registry.names()
    }

    /// True if no listener is registered under any name.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Emits `payload` under `event_name` to every listener registered right now.
    ///
    /// Returns the number of handler invocations started, without waiting for any of them.
    ///
    /// # Errors
    /// - [`BusError::Closed`] after [`shutdown`](Self::shutdown)
    /// - [`BusError::NoRuntime`] when no tokio runtime is reachable
    pub fn emit<P>(&self, event_name: impl Into<Arc<str>>, payload: P) -> Result<usize, BusError>
    where
        P: Any + Send + Sync,
    {
        self.emit_event(Event::new(event_name, payload))
    }

    /// Like [`emit`](Self::emit), for a payload that is already shared.
    pub fn emit_shared(
        &self,
        event_name: impl Into<Arc<str>>,
        payload: Payload,
    ) -> Result<usize, BusError> {
        self.emit_event(Event::from_shared(event_name, payload))
    }

    fn emit_event(&self, event: Event) -> Result<usize, BusError> {
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let event = event.with_seq(seq);
        let listeners = self.inner.registry.snapshot(event.name());

        tracing::debug!(
            event = event.name(),
            seq,
            payload = event.payload_type(),
            listeners = listeners.len(),
            "emitting event"
        );
        self.inner.dispatcher.dispatch(event, listeners)
    }

    /// Subscribes to the failure feed.
    ///
    /// The receiver observes failures of invocations that fail after this call.
    pub fn failures(&self) -> broadcast::Receiver<HandlerFailure> {
        self.inner.feed.subscribe()
    }

    /// Handler invocations started and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.inner.dispatcher.in_flight()
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// True once [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.dispatcher.is_closed()
    }

    /// Stops accepting emissions and waits up to [`BusConfig::grace`] for running handlers.
    ///
    /// Running handlers are never cancelled; the registry stays usable.
    /// An `emit` racing with this call either fails with [`BusError::Closed`] or has its
    /// invocations counted in the drain, so `Ok(())` means no handler of this bus is running.
    /// Calling it again just waits again.
    ///
    /// # Errors
    /// [`BusError::GraceExceeded`] if handlers were still running when the grace period ran out.
    pub async fn shutdown(&self) -> Result<(), BusError> {
        let grace = self.inner.cfg.grace;
        if self.inner.dispatcher.close() {
            tracing::info!(?grace, in_flight = self.in_flight(), "bus shutdown requested");
        }

        match tokio::time::timeout(grace, self.inner.dispatcher.drained()).await {
            Ok(()) => {
                tracing::info!("all handlers finished within grace");
                Ok(())
            }
            Err(_) => {
                let in_flight = self.in_flight();
                tracing::warn!(?grace, in_flight, "shutdown grace exceeded");
                Err(BusError::GraceExceeded { grace, in_flight })
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
