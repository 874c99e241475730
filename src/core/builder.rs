use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use super::{bus::EventBus, dispatch::Dispatcher, registry::Registry};
use crate::{config::BusConfig, events::FailureFeed};

/// Builder for constructing an [`EventBus`] with optional settings.
pub struct EventBusBuilder {
    cfg: BusConfig,
    runtime: Option<Handle>,
}

impl EventBusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self { cfg, runtime: None }
    }

    /// Pins dispatch to a specific tokio runtime.
    ///
    /// Without it, `emit` spawns onto the runtime current at the call site and fails
    /// with [`BusError::NoRuntime`](crate::BusError::NoRuntime) outside of one.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Builds the bus.
    ///
    /// This consumes the builder and initializes:
    /// - an empty listener registry
    /// - the failure feed (capacity from [`BusConfig::failure_capacity_clamped`])
    /// - the in-flight limiter, if [`BusConfig::in_flight_limit`] is set
    pub fn build(self) -> EventBus {
        let feed = FailureFeed::new(self.cfg.failure_capacity_clamped());
        let limiter = self
            .cfg
            .in_flight_limit()
            .map(Semaphore::new)
            .map(Arc::new);
        let dispatcher = Dispatcher::new(self.runtime, limiter, feed.clone());

        EventBus::from_parts(self.cfg, Registry::new(), dispatcher, feed)
    }
}
