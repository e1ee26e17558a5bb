//! Server entity - a community holding channels, roles and members
//!
//! Membership itself is not stored here. The cache owns the member
//! table keyed by (server, user) and this entity carries everything
//! else the server payload describes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::entities::{Attachment, Category, Role};
use crate::protocol::events::{RoleDataPayload, RoleField, ServerDataPayload, ServerField};
use crate::protocol::payloads::{ServerPayload, SystemMessagesPayload};
use crate::value_objects::{PermissionPair, Ulid};

/// Channels that receive automatic membership system messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemMessageChannels {
    pub user_joined: Option<Ulid>,
    pub user_left: Option<Ulid>,
    pub user_kicked: Option<Ulid>,
    pub user_banned: Option<Ulid>,
}

impl SystemMessageChannels {
    fn from_payload(payload: SystemMessagesPayload) -> Self {
        Self {
            user_joined: payload.user_joined,
            user_left: payload.user_left,
            user_kicked: payload.user_kicked,
            user_banned: payload.user_banned,
        }
    }
}

/// Server entity
#[derive(Debug, Clone)]
pub struct Server {
    pub id: Ulid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Ulid,
    pub channel_ids: Vec<Ulid>,
    pub categories: Vec<Category>,
    pub roles: HashMap<Ulid, Role>,
    pub icon: Option<Attachment>,
    pub banner: Option<Attachment>,
    pub nsfw: bool,
    pub system_messages: Option<SystemMessageChannels>,
    pub default_permissions: PermissionPair,
}

impl Server {
    /// Resolve a server from its wire payload
    pub fn from_payload(payload: ServerPayload) -> Self {
        let roles = payload
            .roles
            .unwrap_or_default()
            .into_iter()
            .map(|(id, role)| (id, Role::from_payload(id, role)))
            .collect();
        let categories = payload
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(Category::from_payload)
            .collect();

        Self {
            id: payload.id,
            name: payload.name,
            description: payload.description,
            owner_id: payload.owner,
            channel_ids: payload.channels,
            categories,
            roles,
            icon: payload.icon.map(Attachment::from_payload),
            banner: payload.banner.map(Attachment::from_payload),
            nsfw: payload.nsfw.unwrap_or(false),
            system_messages: payload.system_messages.map(SystemMessageChannels::from_payload),
            default_permissions: payload.default_permissions,
        }
    }

    /// Apply a partial update frame: clears first, then sparse data
    pub fn apply_update(&mut self, data: &ServerDataPayload, clear: &[ServerField]) {
        for field in clear {
            match field {
                ServerField::Icon => self.icon = None,
                ServerField::Banner => self.banner = None,
                ServerField::Description => self.description = None,
            }
        }

        if let Some(name) = &data.name {
            self.name = name.clone();
        }
        if let Some(owner) = data.owner {
            self.owner_id = owner;
        }
        if let Some(description) = &data.description {
            self.description = Some(description.clone());
        }
        if let Some(channels) = &data.channels {
            self.channel_ids = channels.clone();
        }
        if let Some(categories) = &data.categories {
            self.categories = categories
                .iter()
                .cloned()
                .map(Category::from_payload)
                .collect();
        }
        if let Some(system_messages) = &data.system_messages {
            self.system_messages = Some(SystemMessageChannels::from_payload(system_messages.clone()));
        }
        if let Some(default_permissions) = data.default_permissions {
            self.default_permissions = default_permissions;
        }
        if let Some(icon) = &data.icon {
            self.icon = Some(Attachment::from_payload(icon.clone()));
        }
        if let Some(banner) = &data.banner {
            self.banner = Some(Attachment::from_payload(banner.clone()));
        }
        if let Some(nsfw) = data.nsfw {
            self.nsfw = nsfw;
        }
    }

    /// Look up a role by id
    #[inline]
    pub fn role(&self, role_id: Ulid) -> Option<&Role> {
        self.roles.get(&role_id)
    }

    /// Roles ordered by rank, strongest first
    #[must_use]
    pub fn roles_by_rank(&self) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self.roles.values().collect();
        roles.sort_by_key(|role| role.rank);
        roles
    }

    /// Insert or replace a role
    pub fn upsert_role(&mut self, role: Role) {
        self.roles.insert(role.id, role);
    }

    /// Patch an existing role in place; false when the role is unknown
    pub fn patch_role(&mut self, role_id: Ulid, data: &RoleDataPayload, clear: &[RoleField]) -> bool {
        match self.roles.get_mut(&role_id) {
            Some(role) => {
                role.apply_update(data, clear);
                true
            }
            None => false,
        }
    }

    /// Remove a role; returns the removed role when it existed
    pub fn remove_role(&mut self, role_id: Ulid) -> Option<Role> {
        self.roles.remove(&role_id)
    }

    /// Check if a channel belongs to this server
    #[inline]
    pub fn has_channel(&self, channel_id: Ulid) -> bool {
        self.channel_ids.contains(&channel_id)
    }

    /// Category containing a channel, if any
    pub fn category_of(&self, channel_id: Ulid) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.contains_channel(channel_id))
    }

    /// When the server was created, derived from its id
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}
