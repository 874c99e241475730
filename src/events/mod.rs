//! Events and failure reporting.
//!
//! This module groups the **data model** handed to handlers and the **feed** used to
//! observe handler failures.
//!
//! ## Contents
//! - [`Event`], [`Payload`] the immutable value each handler receives
//! - [`HandlerFailure`], [`FailureKind`] one failed invocation
//! - [`FailureFeed`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `EventBus::emit` builds events; dispatcher invocations publish failures.
//! - **Consumers**: listener handlers (events) and `EventBus::failures()` receivers.

mod event;
mod failure;
mod feed;

pub use event::{Event, Payload};
pub use failure::{FailureKind, HandlerFailure};
pub use feed::FailureFeed;
