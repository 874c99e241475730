//! # Events delivered to listeners.
//!
//! An [`Event`] is the immutable value a handler receives: the event name, an opaque
//! payload, and bookkeeping set by the bus at emission time.
//!
//! The payload is stored as [`Payload`] (`Arc<dyn Any + Send + Sync>`), so cloning an
//! event is cheap and every listener of one emission shares the same payload allocation.
//! Handlers recover the concrete value with [`Event::payload`].
//!
//! ## Ordering
//! Each event carries a per-bus sequence number (`seq`) that increases monotonically
//! with every `emit`. Handlers run concurrently, so use `seq` to restore emission order
//! when it matters.
//!
//! ## Example
//! ```rust
//! use busline::Event;
//!
//! let ev = Event::new("call:event", "payload-X");
//!
//! assert_eq!(ev.name(), "call:event");
//! assert_eq!(ev.payload::<&str>(), Some(&"payload-X"));
//! assert_eq!(ev.payload::<String>(), None);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Shared, type-erased event payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Immutable (name, payload) value passed to handlers.
///
/// - `name`: event name the listeners were registered under
/// - `payload`: opaque to the bus; see [`Event::payload`]
/// - `seq`: per-bus emission sequence (0 for events built outside a bus)
/// - `at`: wall-clock timestamp of emission
#[derive(Clone)]
pub struct Event {
    name: Arc<str>,
    payload: Payload,
    payload_type: &'static str,
    seq: u64,
    at: SystemTime,
}

impl Event {
    /// Creates an event with the current timestamp and `seq = 0`.
    pub fn new<P>(name: impl Into<Arc<str>>, payload: P) -> Self
    where
        P: Any + Send + Sync,
    {
        Self {
            name: name.into(),
            payload: Arc::new(payload),
            payload_type: std::any::type_name::<P>(),
            seq: 0,
            at: SystemTime::now(),
        }
    }

    /// Creates an event around an already shared payload.
    ///
    /// The payload type name is not known in this case and reads as `"<shared>"`.
    pub fn from_shared(name: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            payload,
            payload_type: "<shared>",
            seq: 0,
            at: SystemTime::now(),
        }
    }

    #[inline]
    pub(crate) fn with_seq(mut self, seq: u64) -> Self {
        self.seq = seq;
        self
    }

    /// Event name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emission sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wall-clock emission timestamp.
    #[inline]
    pub fn at(&self) -> SystemTime {
        self.at
    }

    /// Returns the payload as `&T`, or `None` if it holds another type.
    #[inline]
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Returns the type-erased payload handle.
    #[inline]
    pub fn payload_any(&self) -> &Payload {
        &self.payload
    }

    /// Type name of the payload as given to the bus.
    #[inline]
    pub fn payload_type(&self) -> &'static str {
        self.payload_type
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("payload", &self.payload_type)
            .field("seq", &self.seq)
            .field("at", &self.at)
            .finish()
    }
}
