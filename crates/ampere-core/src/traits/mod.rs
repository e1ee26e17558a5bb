//! Trait ports the infrastructure crates implement

mod transport;

pub use transport::{MessageQuery, MessageSort, Transport};
