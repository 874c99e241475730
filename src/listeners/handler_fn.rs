//! # Closure-backed handlers.
//!
//! [`HandlerFn`] wraps an async closure `F: Fn(Event) -> Fut`, producing a fresh future per
//! invocation. [`SyncHandlerFn`] wraps a plain `F: Fn(&Event)` for handlers with no async work.
//!
//! ## Concurrency semantics
//! - Each invocation of a [`HandlerFn`] creates a **new** future that owns its clone of the event.
//! - The closure itself is shared across concurrent invocations (`Fn`, not `FnMut`);
//!   keep shared state behind `Arc<...>` explicitly inside the closure.
//! - A [`SyncHandlerFn`] runs on the invocation's task: it must not block.
//!
//! ## Example
//! ```rust
//! use busline::{Event, Handler, HandlerError, HandlerFn, HandlerRef, SyncHandlerFn};
//!
//! let echo: HandlerRef = HandlerFn::arc("echo", |ev: Event| async move {
//!     println!("{} #{}", ev.name(), ev.seq());
//!     Ok::<_, HandlerError>(())
//! });
//! assert_eq!(echo.name(), "echo");
//!
//! let count: HandlerRef = SyncHandlerFn::arc("count", |_ev: &Event| {});
//! assert_eq!(count.name(), "count");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;
use crate::listeners::handler::Handler;

/// Async-closure-backed handler.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new closure-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](super::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Plain-closure-backed handler. Never fails except by panicking.
#[derive(Debug)]
pub struct SyncHandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SyncHandlerFn<F> {
    /// Creates a new closure-backed handler.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Handler for SyncHandlerFn<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
