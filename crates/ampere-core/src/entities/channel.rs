//! Channel entity - any place messages can be sent
//!
//! One struct covers all channel kinds. Fields that only apply to
//! some kinds stay at their defaults for the others, and `kind`
//! records which shape the channel arrived as.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::entities::Attachment;
use crate::protocol::events::{ChannelDataPayload, ChannelField};
use crate::protocol::payloads::ChannelPayload;
use crate::value_objects::{ChannelPermissions, Ulid};

/// Kind of channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Voice,
    Group,
    DirectMessage,
    SavedMessages,
}

/// Channel entity
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: Ulid,
    pub kind: ChannelKind,
    pub server_id: Option<Ulid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<Attachment>,
    pub active: bool,
    pub recipient_ids: Vec<Ulid>,
    pub owner_id: Option<Ulid>,
    pub permission: Option<ChannelPermissions>,
    pub default_permissions: Option<ChannelPermissions>,
    pub role_permissions: HashMap<Ulid, ChannelPermissions>,
    pub last_message_id: Option<Ulid>,
}

impl Channel {
    /// Resolve a channel from its wire payload
    pub fn from_payload(payload: ChannelPayload) -> Self {
        match payload {
            ChannelPayload::SavedMessage { id, user } => Self {
                id,
                kind: ChannelKind::SavedMessages,
                recipient_ids: vec![user],
                ..Self::empty(id, ChannelKind::SavedMessages)
            },
            ChannelPayload::DirectMessage {
                id,
                active,
                recipients,
                last_message,
            } => Self {
                id,
                active,
                recipient_ids: recipients,
                last_message_id: last_message.map(|message| message.id),
                ..Self::empty(id, ChannelKind::DirectMessage)
            },
            ChannelPayload::Group {
                id,
                recipients,
                name,
                owner,
                icon,
                permission,
                description,
            } => Self {
                id,
                name: Some(name),
                description,
                icon: icon.map(Attachment::from_payload),
                active: true,
                recipient_ids: recipients,
                owner_id: Some(owner),
                permission,
                ..Self::empty(id, ChannelKind::Group)
            },
            ChannelPayload::TextChannel {
                id,
                server,
                name,
                description,
                icon,
                default_permissions,
                role_permissions,
                last_message,
            } => Self {
                id,
                server_id: Some(server),
                name: Some(name),
                description,
                icon: icon.map(Attachment::from_payload),
                default_permissions,
                role_permissions: role_permissions.unwrap_or_default(),
                last_message_id: last_message,
                ..Self::empty(id, ChannelKind::Text)
            },
            ChannelPayload::VoiceChannel {
                id,
                server,
                name,
                description,
                icon,
                default_permissions,
                role_permissions,
            } => Self {
                id,
                server_id: Some(server),
                name: Some(name),
                description,
                icon: icon.map(Attachment::from_payload),
                default_permissions,
                role_permissions: role_permissions.unwrap_or_default(),
                ..Self::empty(id, ChannelKind::Voice)
            },
        }
    }

    fn empty(id: Ulid, kind: ChannelKind) -> Self {
        Self {
            id,
            kind,
            server_id: None,
            name: None,
            description: None,
            icon: None,
            active: false,
            recipient_ids: Vec::new(),
            owner_id: None,
            permission: None,
            default_permissions: None,
            role_permissions: HashMap::new(),
            last_message_id: None,
        }
    }

    /// Apply a partial update frame: clears first, then sparse data
    pub fn apply_update(&mut self, data: &ChannelDataPayload, clear: &[ChannelField]) {
        for field in clear {
            match field {
                ChannelField::Icon => self.icon = None,
                ChannelField::Description => self.description = None,
            }
        }

        if let Some(name) = &data.name {
            self.name = Some(name.clone());
        }
        if let Some(description) = &data.description {
            self.description = Some(description.clone());
        }
        if let Some(icon) = &data.icon {
            self.icon = Some(Attachment::from_payload(icon.clone()));
        }
        if let Some(recipients) = &data.recipients {
            self.recipient_ids = recipients.clone();
        }
        if let Some(active) = data.active {
            self.active = active;
        }
        if let Some(owner) = data.owner {
            self.owner_id = Some(owner);
        }
        if let Some(permission) = data.permission {
            self.permission = Some(permission);
        }
        if let Some(default_permissions) = data.default_permissions {
            self.default_permissions = Some(default_permissions);
        }
        if let Some(role_permissions) = &data.role_permissions {
            self.role_permissions = role_permissions.clone();
        }
        if let Some(last_message) = data.last_message {
            self.last_message_id = Some(last_message);
        }
    }

    /// Name shown for this channel, with a kind-based fallback
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => match self.kind {
                ChannelKind::DirectMessage => "Direct Message".to_string(),
                ChannelKind::SavedMessages => "Saved Messages".to_string(),
                _ => self.id.to_string(),
            },
        }
    }

    /// Check if the channel belongs to a server
    #[inline]
    pub fn is_server_channel(&self) -> bool {
        self.server_id.is_some()
    }

    /// Check if the channel is a direct message
    #[inline]
    pub fn is_direct_message(&self) -> bool {
        matches!(self.kind, ChannelKind::DirectMessage)
    }

    /// The other participant of a direct message, from the local user's view
    pub fn dm_peer(&self, self_id: Ulid) -> Option<Ulid> {
        if !self.is_direct_message() {
            return None;
        }
        self.recipient_ids
            .iter()
            .copied()
            .find(|&recipient| recipient != self_id)
            .or_else(|| self.recipient_ids.first().copied())
    }

    /// When the channel was created, derived from its id
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}
