//! # ampere-cache
//!
//! Bounded in-memory entity store. Holds the single live instance of every
//! cached user, channel, server, member, and message, resolves misses
//! through the transport port, and populates itself from the gateway's
//! bootstrap snapshot.

pub mod bootstrap;
pub mod error;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EntityKind, StoreError, StoreResult};
pub use store::Store;
