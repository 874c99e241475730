//! Bus core: registry, dispatch, and lifecycle.
//!
//! The public API from this module is [`EventBus`] and its [`EventBusBuilder`].
//!
//! Internal modules:
//! - [`registry`]: event name → ordered listener handles, behind one mutex;
//! - [`dispatch`]: spawns one tracked task per matched listener and contains failures;
//! - [`bus`]: the public facade tying registry, dispatcher and failure feed together;
//! - [`builder`]: assembles a bus from [`BusConfig`](crate::BusConfig).

mod builder;
mod bus;
mod dispatch;
mod registry;

pub use builder::EventBusBuilder;
pub use bus::EventBus;
