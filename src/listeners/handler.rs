//! # Event handler trait.
//!
//! Provides [`Handler`], the callable half of a [`Listener`](super::Listener).
//!
//! Each matched handler gets:
//! - **Its own spawned task** per emission (runs independently of the emitter)
//! - **Failure isolation** (errors and panics are caught, logged, and published on the failure feed)
//!
//! ## Architecture
//! ```text
//! emit(name, payload) ──► snapshot listeners ──► spawn ──► handler.handle(&Event)
//!                                                  └─► Err / panic → HandlerFailure
//! ```
//!
//! ## Rules
//! - A slow handler only occupies its own task.
//! - Handlers of the same emission run concurrently; there is no ordering between them.
//! - Handlers do not block the emitter or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use busline::{Event, Handler, HandlerError};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Handler for Audit {
//!     async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
//!         let user = event
//!             .payload::<String>()
//!             .ok_or_else(|| HandlerError::rejected("expected String payload"))?;
//!         // write an audit record for `user`...
//!         let _ = user;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// Shared handle to a handler (`Arc<dyn Handler>`).
pub type HandlerRef = Arc<dyn Handler>;

/// Asynchronous event handler.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return [`HandlerError`] for expected failures; panics are caught but should stay exceptional.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from a dedicated task, never in the emitter's context.
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;

    /// Returns the handler name used in logs and failure records.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
