//! # Bus configuration.
//!
//! Provides [`BusConfig`] centralized settings for an [`EventBus`](crate::EventBus),
//! consumed by [`EventBus::builder`](crate::EventBus::builder).
//!
//! ## Sentinel values
//! - `max_in_flight = 0` → unlimited (no semaphore created)
//! - `max_in_flight > Semaphore::MAX_PERMITS` → clamped to `MAX_PERMITS`
//! - `failure_capacity = 0` → clamped to 1

use std::time::Duration;

use tokio::sync::Semaphore;

/// Configuration for an event bus.
///
/// Defines:
/// - **Dispatch limits**: how many handler invocations may execute at once
/// - **Failure feed**: ring buffer size of the failure broadcast channel
/// - **Shutdown behavior**: grace period for draining running handlers
///
/// ## Field semantics
/// - `max_in_flight`: Execution cap across all handlers of this bus (`0` = unlimited)
/// - `failure_capacity`: Failure feed ring buffer size (min 1; clamped)
/// - `grace`: Maximum wait for running handlers during [`shutdown`](crate::EventBus::shutdown)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum number of handler invocations executing at the same time.
    ///
    /// - `0` = unlimited: every matched listener runs immediately
    /// - `n > 0` = at most `n` invocations run; the rest wait for a permit
    ///
    /// Waiting happens inside the spawned invocation, so `emit` never blocks.
    pub max_in_flight: usize,

    /// Capacity of the failure feed broadcast channel.
    ///
    /// Receivers that lag behind more than `failure_capacity` records observe
    /// `Lagged` and skip older records.
    pub failure_capacity: usize,

    /// Maximum time [`EventBus::shutdown`](crate::EventBus::shutdown) waits for
    /// running handler invocations.
    ///
    /// `Duration::ZERO` means "do not wait": shutdown reports any running invocation.
    pub grace: Duration,
}

impl BusConfig {
    /// Returns the execution cap as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent invocations, `n` capped at [`Semaphore::MAX_PERMITS`]
    #[inline]
    pub fn in_flight_limit(&self) -> Option<usize> {
        if self.max_in_flight == 0 {
            None
        } else {
            Some(self.max_in_flight.min(Semaphore::MAX_PERMITS))
        }
    }

    /// Returns the failure feed capacity clamped to a minimum of 1.
    #[inline]
    pub fn failure_capacity_clamped(&self) -> usize {
        self.failure_capacity.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `max_in_flight = 0` (unlimited)
    /// - `failure_capacity = 256`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            max_in_flight: 0,
            failure_capacity: 256,
            grace: Duration::from_secs(30),
        }
    }
}
