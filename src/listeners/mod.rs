//! # Listeners: handlers bound to event names.
//!
//! This module provides the listener-related types:
//! - [`Handler`] - trait for async event handlers
//! - [`HandlerFn`], [`SyncHandlerFn`] - closure-backed handlers
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler>`)
//! - [`Listener`], [`ListenerId`] - identity-bearing (event name, handler) handle

mod handler;
mod handler_fn;
mod listener;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::{HandlerFn, SyncHandlerFn};
pub use listener::{Listener, ListenerId};
