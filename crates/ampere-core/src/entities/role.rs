//! Role entity - a named permission bundle inside a server

use crate::protocol::events::{RoleDataPayload, RoleField};
use crate::protocol::payloads::RolePayload;
use crate::value_objects::{ChannelPermissions, ServerPermissions, Ulid};

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Ulid,
    pub name: String,
    pub rank: i64,
    pub colour: Option<String>,
    pub hoist: bool,
    pub server_permissions: ServerPermissions,
    pub channel_permissions: ChannelPermissions,
}

impl Role {
    /// Resolve a role from its wire payload (roles arrive keyed by id)
    pub fn from_payload(id: Ulid, payload: RolePayload) -> Self {
        Self {
            id,
            name: payload.name,
            rank: payload.rank,
            colour: payload.colour,
            hoist: payload.hoist.unwrap_or(false),
            server_permissions: payload.permissions.server(),
            channel_permissions: payload.permissions.channel(),
        }
    }

    /// Apply a partial update frame: clears first, then sparse data
    pub fn apply_update(&mut self, data: &RoleDataPayload, clear: &[RoleField]) {
        for field in clear {
            match field {
                RoleField::Colour => self.colour = None,
            }
        }

        if let Some(name) = &data.name {
            self.name = name.clone();
        }
        if let Some(colour) = &data.colour {
            self.colour = Some(colour.clone());
        }
        if let Some(hoist) = data.hoist {
            self.hoist = hoist;
        }
        if let Some(rank) = data.rank {
            self.rank = rank;
        }
        if let Some(permissions) = data.permissions {
            self.server_permissions = permissions.server();
            self.channel_permissions = permissions.channel();
        }
    }
}
