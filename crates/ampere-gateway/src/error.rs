//! Gateway errors - socket failures, frame decoding, and waiter outcomes

use ampere_cache::StoreError;
use thiserror::Error;

/// Result alias used across the gateway
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors produced while driving the gateway connection
#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Connection
    // =========================================================================
    #[error("WebSocket failure: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to decode frame: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("Gateway is not connected")]
    NotConnected,

    #[error("Gateway is already running")]
    AlreadyRunning,

    #[error("Socket closed by the server")]
    Closed,

    #[error("Session rejected before going live: {0}")]
    Rejected(String),

    // =========================================================================
    // Cache (wrapped)
    // =========================================================================
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ampere_core::TransportError> for GatewayError {
    fn from(err: ampere_core::TransportError) -> Self {
        Self::Store(StoreError::Transport(err))
    }
}

impl GatewayError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Socket(_) => "SOCKET_FAILED",
            Self::Frame(_) => "FRAME_DECODE_FAILED",
            Self::NotConnected => "NOT_CONNECTED",
            Self::AlreadyRunning => "ALREADY_RUNNING",
            Self::Closed => "SOCKET_CLOSED",
            Self::Rejected(_) => "SESSION_REJECTED",
            Self::Store(err) => err.code(),
        }
    }

    /// Check whether reconnecting could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Socket(_) | Self::Closed)
    }
}

/// Errors surfaced by [`wait_for`](crate::EventDispatcher::wait_for)
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Timed out waiting for {event}")]
    Timeout { event: String },

    #[error("Dispatcher dropped the waiter for {event}")]
    WaiterDropped { event: String },
}
