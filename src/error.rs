//! Error types used by the bus and by listener handlers.
//!
//! This module defines two main error enums:
//!
//! - [`BusError`] — errors raised by the bus itself (dispatch and shutdown).
//! - [`HandlerError`] — errors returned by individual handler invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Registry operations (`register`, `unregister`, `clear`) never fail and have no error type.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the event bus.
///
/// These represent failures of the bus to dispatch or drain, never failures of handlers:
/// a failing handler is confined to its own invocation and surfaces only in logs and
/// on the failure feed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No tokio runtime was configured and none was current at `emit` time.
    #[error("no tokio runtime available to dispatch event {event:?}")]
    NoRuntime {
        /// Name of the event that could not be dispatched.
        event: String,
    },

    /// The bus was shut down; the event was not dispatched.
    #[error("bus is closed; event {event:?} was not dispatched")]
    Closed {
        /// Name of the rejected event.
        event: String,
    },

    /// Shutdown grace period was exceeded with handlers still running.
    #[error("shutdown grace {grace:?} exceeded; {in_flight} handler(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Invocations still running when the grace period ran out.
        in_flight: usize,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use busline::BusError;
    ///
    /// let err = BusError::Closed { event: "ping".into() };
    /// assert_eq!(err.as_label(), "bus_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::NoRuntime { .. } => "bus_no_runtime",
            BusError::Closed { .. } => "bus_closed",
            BusError::GraceExceeded { .. } => "bus_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::NoRuntime { event } => format!("no runtime for event={event}"),
            BusError::Closed { event } => format!("closed; dropped event={event}"),
            BusError::GraceExceeded { grace, in_flight } => {
                format!("grace exceeded after {grace:?}; in_flight={in_flight}")
            }
        }
    }
}

/// # Errors returned by a handler invocation.
///
/// Returning an error has the same effect as any other failure: it is logged,
/// published on the failure feed, and never reaches the emitter or sibling handlers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler ran and failed.
    #[error("handler failed: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },

    /// The handler refused the event (for example, an unexpected payload type).
    #[error("handler rejected event: {reason}")]
    Rejected {
        /// Why the event was refused.
        reason: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        HandlerError::Failed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`HandlerError::Rejected`].
    pub fn rejected(reason: impl Into<String>) -> Self {
        HandlerError::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use busline::HandlerError;
    ///
    /// let err = HandlerError::failed("boom");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Rejected { .. } => "handler_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { reason } => format!("error: {reason}"),
            HandlerError::Rejected { reason } => format!("rejected: {reason}"),
        }
    }
}
