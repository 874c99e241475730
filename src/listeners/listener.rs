//! # Listener handles and identity.
//!
//! A [`Listener`] pairs an event name with a [`Handler`](crate::Handler). It is a cheap-to-clone handle:
//! every clone shares one [`ListenerId`], and the registry stores such a clone, never a copy
//! of the handler.
//!
//! ## Identity rules
//! - `Listener::new` (and the `from_*` constructors) always mint a fresh id.
//! - Clones compare equal; two separately created listeners never do, even when their
//!   handlers behave identically.
//! - [`EventBus::unregister`](crate::EventBus::unregister) matches by id only.
//!
//! ```rust
//! use busline::{Event, Listener};
//!
//! let a = Listener::from_fn("tick", |_ev: &Event| {});
//! let b = Listener::from_fn("tick", |_ev: &Event| {});
//!
//! assert_eq!(a, a.clone());
//! assert_ne!(a, b);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::HandlerError;
use crate::events::Event;
use crate::listeners::handler::HandlerRef;
use crate::listeners::handler_fn::{HandlerFn, SyncHandlerFn};

/// Process-wide listener id counter. Ids are never reused.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[inline]
    pub(crate) fn next() -> Self {
        ListenerId(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value (for logs).
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

struct Inner {
    id: ListenerId,
    event_name: Arc<str>,
    handler: HandlerRef,
}

/// A registered (event name, handler) pair with stable identity.
#[derive(Clone)]
pub struct Listener {
    inner: Arc<Inner>,
}

impl Listener {
    /// Creates a listener for `event_name` backed by `handler`.
    ///
    /// Any string is a valid event name, including `""`.
    pub fn new(event_name: impl Into<Arc<str>>, handler: HandlerRef) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: ListenerId::next(),
                event_name: event_name.into(),
                handler,
            }),
        }
    }

    /// Creates a listener from an async closure; the handler is named after the event.
    pub fn from_async<F, Fut>(event_name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let event_name = event_name.into();
        let handler = HandlerFn::arc(event_name.to_string(), f);
        Self::new(event_name, handler)
    }

    /// Creates a listener from a plain closure; the handler is named after the event.
    pub fn from_fn<F>(event_name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        let handler = SyncHandlerFn::arc(event_name.to_string(), f);
        Self::new(event_name, handler)
    }

    /// Identity shared by all clones of this listener.
    #[inline]
    pub fn id(&self) -> ListenerId {
        self.inner.id
    }

    /// Event name this listener is registered under.
    #[inline]
    pub fn event_name(&self) -> &str {
        &self.inner.event_name
    }

    /// The handler invoked on emission.
    #[inline]
    pub fn handler(&self) -> &HandlerRef {
        &self.inner.handler
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.inner.id)
            .field("event_name", &self.inner.event_name)
            .field("handler", &self.inner.handler.name())
            .finish()
    }
}
