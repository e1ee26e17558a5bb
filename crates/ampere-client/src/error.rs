//! Client errors - one umbrella over every layer below

use ampere_cache::StoreError;
use ampere_common::ConfigError;
use ampere_core::TransportError;
use ampere_gateway::{DispatchError, GatewayError};
use thiserror::Error;

/// Result alias used across the client
pub type ClientResult<T> = Result<T, ClientError>;

/// Any failure the client surface can report
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ClientError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_INVALID",
            Self::Transport(err) => err.code(),
            Self::Store(err) => err.code(),
            Self::Gateway(err) => err.code(),
            Self::Dispatch(DispatchError::Timeout { .. }) => "WAIT_TIMEOUT",
            Self::Dispatch(DispatchError::WaiterDropped { .. }) => "WAITER_DROPPED",
        }
    }

    /// Check whether the failure is a missing entity or a 404
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_not_found(),
            Self::Store(err) => err.is_not_found(),
            Self::Gateway(GatewayError::Store(err)) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check whether a wait-for expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Dispatch(DispatchError::Timeout { .. }))
    }
}
