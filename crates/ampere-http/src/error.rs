//! Maps reqwest failures into core transport errors

use ampere_core::TransportError;

/// Map a reqwest error to a TransportError
pub(crate) fn map_request_error(err: reqwest::Error) -> TransportError {
    if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else if let Some(status) = err.status() {
        TransportError::Status {
            status: status.as_u16(),
        }
    } else {
        TransportError::Request(err.to_string())
    }
}
