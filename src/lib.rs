//! # busline
//!
//! **busline** is an in-process publish/subscribe event bus for tokio applications.
//!
//! Producers register named handlers ([`Listener`]s) and later [`emit`](EventBus::emit)
//! named events carrying arbitrary payloads. Every listener registered for that name is
//! invoked on its own task, concurrently, and `emit` returns without waiting.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Listener A  │   │  Listener B  │   │  Listener C  │
//!     │  ("ping")    │   │  ("ping")    │   │  ("pong")    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ register         ▼ register         ▼ register
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus                                                         │
//! │  - Registry (name → [Listener], one mutex, no empty entries)      │
//! │  - Dispatcher (one tracked task per matched listener)             │
//! │  - FailureFeed (broadcast of handler errors/panics)               │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ emit("ping", payload)
//!        │   ├─► seq += 1, Event{name, payload, seq, at}
//!        │   ├─► snapshot registry["ping"] under the lock
//!        │   └─► spawn per listener, return immediately
//!        ▼
//!   task A: A.handle(&Event)      task B: B.handle(&Event)
//!        │                             │
//!        └── Err / panic ──► log + FailureFeed (never back to the emitter)
//! ```
//!
//! ### Guarantees
//! - Registry operations are serialized by one lock and never fail.
//! - A handler never runs while the registry lock is held.
//! - Identity is per [`Listener`] handle: clones are the same listener, separately built
//!   listeners never are, whatever their handlers do.
//! - No ordering between handlers, no retries, no backpressure unless
//!   [`BusConfig::max_in_flight`] is set.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Bus**           | Register, remove, inspect, emit, shut down.                  | [`EventBus`], [`EventBusBuilder`]          |
//! | **Listeners**     | Bind handlers to event names with stable identity.           | [`Listener`], [`ListenerId`]               |
//! | **Handlers**      | Async trait or closures.                                     | [`Handler`], [`HandlerFn`], [`SyncHandlerFn`] |
//! | **Events**        | Immutable name + opaque payload.                             | [`Event`], [`Payload`]                     |
//! | **Failures**      | Observe handler errors and panics.                           | [`HandlerFailure`], [`FailureKind`]        |
//! | **Errors**        | Typed errors for the bus and for handlers.                   | [`BusError`], [`HandlerError`]             |
//! | **Configuration** | In-flight cap, failure feed size, shutdown grace.            | [`BusConfig`]                              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use busline::{BusConfig, Event, EventBus, Listener};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::builder(BusConfig::default()).build();
//!     let hits = Arc::new(AtomicUsize::new(0));
//!
//!     for _ in 0..3 {
//!         let hits = Arc::clone(&hits);
//!         bus.register(&Listener::from_fn("ping", move |_ev: &Event| {
//!             hits.fetch_add(1, Ordering::SeqCst);
//!         }));
//!     }
//!
//!     assert_eq!(bus.emit("ping", "hello")?, 3);
//!
//!     // emit does not wait; shutdown drains running handlers.
//!     bus.shutdown().await?;
//!     assert_eq!(hits.load(Ordering::SeqCst), 3);
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use config::BusConfig;
pub use crate::core::{EventBus, EventBusBuilder};
pub use error::{BusError, HandlerError};
pub use events::{Event, FailureKind, HandlerFailure, Payload};
pub use listeners::{Handler, HandlerFn, HandlerRef, Listener, ListenerId, SyncHandlerFn};
