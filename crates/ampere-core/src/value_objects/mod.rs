//! Value objects - immutable types that represent domain concepts

mod permissions;
mod ulid;

pub use permissions::{ChannelPermissions, PermissionPair, ServerPermissions, UserBadges};
pub use ulid::{Ulid, UlidDecodeError, UlidGenerator};
