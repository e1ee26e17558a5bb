//! Gateway frame definitions
//!
//! Every frame is decoded exactly once at the socket boundary into
//! [`ServerEvent`]; handlers never touch raw JSON. Frames whose `type`
//! tag is unknown fail to decode and are surfaced to the caller as a
//! decode error. Partial-update frames carry a sparse `data` payload
//! plus a `clear` list naming fields reset to their defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::protocol::payloads::{
    CategoryPayload, ChannelPayload, EditedTimestampPayload, FilePayload, MemberIdPayload,
    MemberPayload, MessagePayload, RelationshipKind, ServerPayload, StatusPayload,
    SystemMessagesPayload, UserPayload,
};
use crate::value_objects::{ChannelPermissions, PermissionPair, Ulid, UserBadges};

// === Clearable fields ===

/// User fields a partial update may reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserField {
    Avatar,
    StatusText,
    ProfileContent,
    ProfileBackground,
}

/// Channel fields a partial update may reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelField {
    Icon,
    Description,
}

/// Server fields a partial update may reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerField {
    Icon,
    Banner,
    Description,
}

/// Member fields a partial update may reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberField {
    Nickname,
    Avatar,
}

/// Role fields a partial update may reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleField {
    #[serde(alias = "Color")]
    Colour,
}

// === Partial update payloads ===

/// Sparse message fields carried by an edit frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEditDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<EditedTimestampPayload>,
}

/// Sparse channel fields carried by an update frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<Ulid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<ChannelPermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_permissions: Option<ChannelPermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_permissions: Option<HashMap<Ulid, ChannelPermissions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Ulid>,
}

/// Sparse server fields carried by an update frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Ulid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_messages: Option<SystemMessagesPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_permissions: Option<PermissionPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
}

/// Sparse member fields carried by an update frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Ulid>>,
}

/// Sparse role fields carried by an update frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionPair>,
}

/// Sparse user fields carried by an update frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserDataPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badges: Option<UserBadges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(rename = "profile.content", skip_serializing_if = "Option::is_none")]
    pub profile_content: Option<String>,
    #[serde(rename = "profile.background", skip_serializing_if = "Option::is_none")]
    pub profile_background: Option<FilePayload>,
}

// === Inbound frames ===

/// Every frame the gateway can deliver, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    Authenticated,
    Pong {
        #[serde(default)]
        data: serde_json::Value,
    },
    Error {
        error: String,
    },
    Ready {
        users: Vec<UserPayload>,
        servers: Vec<ServerPayload>,
        channels: Vec<ChannelPayload>,
        #[serde(default)]
        members: Vec<MemberPayload>,
    },
    Message(MessagePayload),
    MessageUpdate {
        id: Ulid,
        channel: Ulid,
        data: MessageEditDataPayload,
    },
    MessageDelete {
        id: Ulid,
        channel: Ulid,
    },
    ChannelCreate(ChannelPayload),
    ChannelUpdate {
        id: Ulid,
        #[serde(default)]
        data: ChannelDataPayload,
        #[serde(default)]
        clear: Vec<ChannelField>,
    },
    ChannelDelete {
        id: Ulid,
    },
    ChannelStartTyping {
        id: Ulid,
        user: Ulid,
    },
    ChannelStopTyping {
        id: Ulid,
        user: Ulid,
    },
    ServerUpdate {
        id: Ulid,
        #[serde(default)]
        data: ServerDataPayload,
        #[serde(default)]
        clear: Vec<ServerField>,
    },
    ServerDelete {
        id: Ulid,
    },
    ServerMemberJoin {
        id: Ulid,
        user: Ulid,
    },
    ServerMemberLeave {
        id: Ulid,
        user: Ulid,
    },
    ServerMemberUpdate {
        id: MemberIdPayload,
        #[serde(default)]
        data: MemberDataPayload,
        #[serde(default)]
        clear: Vec<MemberField>,
    },
    ServerRoleUpdate {
        id: Ulid,
        role_id: Ulid,
        #[serde(default)]
        data: RoleDataPayload,
        #[serde(default)]
        clear: Vec<RoleField>,
    },
    ServerRoleDelete {
        id: Ulid,
        role_id: Ulid,
    },
    UserUpdate {
        id: Ulid,
        #[serde(default)]
        data: UserDataPayload,
        #[serde(default)]
        clear: Vec<UserField>,
    },
    UserRelationship {
        id: Ulid,
        user: UserPayload,
        status: RelationshipKind,
    },
}

impl ServerEvent {
    /// Wire tag of the frame, used for raw-event dispatch
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Authenticated => "Authenticated",
            Self::Pong { .. } => "Pong",
            Self::Error { .. } => "Error",
            Self::Ready { .. } => "Ready",
            Self::Message(_) => "Message",
            Self::MessageUpdate { .. } => "MessageUpdate",
            Self::MessageDelete { .. } => "MessageDelete",
            Self::ChannelCreate(_) => "ChannelCreate",
            Self::ChannelUpdate { .. } => "ChannelUpdate",
            Self::ChannelDelete { .. } => "ChannelDelete",
            Self::ChannelStartTyping { .. } => "ChannelStartTyping",
            Self::ChannelStopTyping { .. } => "ChannelStopTyping",
            Self::ServerUpdate { .. } => "ServerUpdate",
            Self::ServerDelete { .. } => "ServerDelete",
            Self::ServerMemberJoin { .. } => "ServerMemberJoin",
            Self::ServerMemberLeave { .. } => "ServerMemberLeave",
            Self::ServerMemberUpdate { .. } => "ServerMemberUpdate",
            Self::ServerRoleUpdate { .. } => "ServerRoleUpdate",
            Self::ServerRoleDelete { .. } => "ServerRoleDelete",
            Self::UserUpdate { .. } => "UserUpdate",
            Self::UserRelationship { .. } => "UserRelationship",
        }
    }
}

// === Outbound frames ===

/// Every frame the client can send, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    Authenticate { token: String },
    Ping { data: i64 },
    BeginTyping { channel: Ulid },
    EndTyping { channel: Ulid },
}
