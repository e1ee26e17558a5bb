//! Store errors - cache misses and propagated transport failures

use ampere_core::{TransportError, Ulid};
use thiserror::Error;

/// Result alias used by every store method
pub type StoreResult<T> = Result<T, StoreError>;

/// The kinds of entity the store tracks, used in error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Channel,
    Server,
    Member,
    Message,
    Role,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Channel => "channel",
            Self::Server => "server",
            Self::Member => "member",
            Self::Message => "message",
            Self::Role => "role",
        };
        f.write_str(name)
    }
}

/// Errors produced by the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Cache Misses
    // =========================================================================
    #[error("{kind} {id} is not cached")]
    NotFound { kind: EntityKind, id: Ulid },

    #[error("member {user_id} of server {server_id} is not cached")]
    MemberNotFound { server_id: Ulid, user_id: Ulid },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl StoreError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_CACHED",
            Self::MemberNotFound { .. } => "MEMBER_NOT_CACHED",
            Self::Transport(err) => err.code(),
        }
    }

    /// Check whether the entity is simply absent, locally or upstream
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::MemberNotFound { .. } => true,
            Self::Transport(err) => err.is_not_found(),
        }
    }
}
