//! Transport errors - failures crossing the network boundary

use thiserror::Error;

/// Result alias used by every transport method
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors produced by the REST transport
#[derive(Debug, Error)]
pub enum TransportError {
    // =========================================================================
    // API Responses
    // =========================================================================
    #[error("API returned status {status}")]
    Status { status: u16 },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("File server is not enabled on this node")]
    FileServerUnavailable,
}

impl TransportError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "API_STATUS",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Request(_) => "REQUEST_FAILED",
            Self::Decode(_) => "DECODE_FAILED",
            Self::FileServerUnavailable => "FILE_SERVER_UNAVAILABLE",
        }
    }

    /// Check if the API reported a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404 })
    }

    /// Check if the API rejected the credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403 })
    }
}
