//! Error types for the core layer

mod transport_error;

pub use transport_error::{TransportError, TransportResult};
