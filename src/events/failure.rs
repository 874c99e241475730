//! # Handler failure records.
//!
//! A [`HandlerFailure`] describes one failed handler invocation. The dispatcher logs it
//! and publishes it on the [`FailureFeed`](super::FailureFeed); nothing is ever returned
//! to the emitter.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::HandlerError;
use crate::listeners::ListenerId;

/// How a handler invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The handler returned a [`HandlerError`].
    Error,
    /// The handler panicked; the panic was caught by the dispatcher.
    Panic,
}

impl FailureKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::Error => "handler_error",
            FailureKind::Panic => "handler_panic",
        }
    }
}

/// One failed handler invocation.
///
/// - `listener`: identity of the listener whose handler failed
/// - `handler`: handler name (see [`Handler::name`](crate::Handler::name))
/// - `event` / `seq`: the emission that triggered the invocation
/// - `reason`: error message or panic message
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    /// Listener whose handler failed.
    pub listener: ListenerId,
    /// Handler name.
    pub handler: Arc<str>,
    /// Event name.
    pub event: Arc<str>,
    /// Sequence number of the emission.
    pub seq: u64,
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub reason: Arc<str>,
    /// Wall-clock timestamp of the failure.
    pub at: SystemTime,
}

impl HandlerFailure {
    /// Builds a record for a handler that returned an error.
    pub(crate) fn errored(
        listener: ListenerId,
        handler: &str,
        event: &str,
        seq: u64,
        err: &HandlerError,
    ) -> Self {
        Self::new(listener, handler, event, seq, FailureKind::Error, err.to_string())
    }

    /// Builds a record for a handler that panicked.
    pub(crate) fn panicked(
        listener: ListenerId,
        handler: &str,
        event: &str,
        seq: u64,
        info: String,
    ) -> Self {
        Self::new(listener, handler, event, seq, FailureKind::Panic, info)
    }

    fn new(
        listener: ListenerId,
        handler: &str,
        event: &str,
        seq: u64,
        kind: FailureKind,
        reason: String,
    ) -> Self {
        Self {
            listener,
            handler: handler.into(),
            event: event.into(),
            seq,
            kind,
            reason: reason.into(),
            at: SystemTime::now(),
        }
    }

    /// True if the handler panicked rather than returning an error.
    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FailureKind::Panic)
    }
}
