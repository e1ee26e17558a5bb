//! # ampere-gateway
//!
//! WebSocket session layer. Drives the connect/authenticate/bootstrap
//! handshake, keeps the entity store current from inbound frames, and fans
//! application events out to registered listeners. Frames for the same
//! entity apply in arrival order; unrelated frames run concurrently.

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod events;

mod handlers;
mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Gateway, GatewayOptions, GatewayState};
pub use dispatch::EventDispatcher;
pub use error::{DispatchError, GatewayError, GatewayResult};
pub use events::Event;
