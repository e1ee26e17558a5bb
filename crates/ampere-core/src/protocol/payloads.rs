//! Wire payload definitions
//!
//! Full entity payloads as delivered by the REST API and the gateway
//! bootstrap, plus the request bodies the client sends. Partial-update
//! payloads carried by live events live in `events`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChannelPermissions, PermissionPair, Ulid, UserBadges};

// === Files ===

/// Kind of content stored behind a file reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Image,
    Video,
    Audio,
    File,
    Text,
}

/// Probed metadata attached to an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadataPayload {
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A file stored on the CDN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub tag: String,
    pub filename: String,
    pub size: u64,
    pub metadata: FileMetadataPayload,
    pub content_type: String,
}

/// Response of a CDN upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFilePayload {
    pub id: String,
}

// === Users ===

/// Presence kind shown next to a user's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Online,
    Idle,
    Busy,
    Invisible,
}

/// Relationship of the local user to another user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    Block,
    BlockedOther,
    Friend,
    Incoming,
    None,
    Outgoing,
    User,
}

/// A user's status line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
}

/// Bot marker carried by bot accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotInfoPayload {
    pub owner: Ulid,
}

/// One entry of a user's relationship list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationPayload {
    #[serde(rename = "_id")]
    pub id: Ulid,
    pub status: RelationshipKind,
}

/// Full user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(rename = "_id")]
    pub id: Ulid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<BotInfoPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<RelationPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badges: Option<UserBadges>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusPayload>,
    #[serde(default)]
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// Lazily fetched profile section of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<FilePayload>,
}

// === Members ===

/// Composite (server, user) member key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberIdPayload {
    pub server: Ulid,
    pub user: Ulid,
}

/// Full member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(rename = "_id")]
    pub id: MemberIdPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FilePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Ulid>>,
}

/// Response of a full member-list fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListPayload {
    pub members: Vec<MemberPayload>,
    pub users: Vec<UserPayload>,
}

// === Servers ===

/// Full role payload, keyed externally by role id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePayload {
    pub name: String,
    pub permissions: PermissionPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoist: Option<bool>,
    pub rank: i64,
}

/// Channel grouping inside a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub id: Ulid,
    pub title: String,
    pub channels: Vec<Ulid>,
}

/// Target channels for automatic system messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemMessagesPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_joined: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_left: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_kicked: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_banned: Option<Ulid>,
}

/// Full server payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPayload {
    #[serde(rename = "_id")]
    pub id: Ulid,
    pub name: String,
    pub owner: Ulid,
    pub channels: Vec<Ulid>,
    pub default_permissions: PermissionPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_messages: Option<SystemMessagesPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<HashMap<Ulid, RolePayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<FilePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discoverable: Option<bool>,
}

// === Channels ===

/// Full channel payload, tagged by channel kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "channel_type")]
pub enum ChannelPayload {
    SavedMessage {
        #[serde(rename = "_id")]
        id: Ulid,
        user: Ulid,
    },
    DirectMessage {
        #[serde(rename = "_id")]
        id: Ulid,
        active: bool,
        recipients: Vec<Ulid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_message: Option<Box<MessagePayload>>,
    },
    Group {
        #[serde(rename = "_id")]
        id: Ulid,
        recipients: Vec<Ulid>,
        name: String,
        owner: Ulid,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<FilePayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        permission: Option<ChannelPermissions>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    TextChannel {
        #[serde(rename = "_id")]
        id: Ulid,
        server: Ulid,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<FilePayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_permissions: Option<ChannelPermissions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role_permissions: Option<HashMap<Ulid, ChannelPermissions>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_message: Option<Ulid>,
    },
    VoiceChannel {
        #[serde(rename = "_id")]
        id: Ulid,
        server: Ulid,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<FilePayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default_permissions: Option<ChannelPermissions>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role_permissions: Option<HashMap<Ulid, ChannelPermissions>>,
    },
}

impl ChannelPayload {
    /// Channel id regardless of kind
    #[must_use]
    pub fn id(&self) -> Ulid {
        match self {
            Self::SavedMessage { id, .. }
            | Self::DirectMessage { id, .. }
            | Self::Group { id, .. }
            | Self::TextChannel { id, .. }
            | Self::VoiceChannel { id, .. } => *id,
        }
    }

    /// Owning server id, when the channel belongs to a server
    #[must_use]
    pub fn server_id(&self) -> Option<Ulid> {
        match self {
            Self::TextChannel { server, .. } | Self::VoiceChannel { server, .. } => Some(*server),
            _ => None,
        }
    }
}

// === Messages ===

/// Timestamp wrapper used by the message edit field
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EditedTimestampPayload {
    #[serde(rename = "$date")]
    pub date: DateTime<Utc>,
}

/// Per-message author override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasqueradePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Image attached to a website embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedImagePayload {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size: EmbedImageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedImageSize {
    Large,
    Preview,
}

/// Video attached to a website embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedVideoPayload {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Platform-specific website embed detail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpecialEmbedPayload {
    Youtube {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
    Twitch {
        id: String,
        content_type: String,
    },
    Spotify {
        id: String,
        content_type: String,
    },
    SoundCloud,
    Bandcamp {
        id: String,
        content_type: String,
    },
}

/// Embed attached to a received message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmbedPayload {
    Website {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        special: Option<SpecialEmbedPayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<EmbedImagePayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        video: Option<EmbedVideoPayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        site_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        colour: Option<String>,
    },
    Image,
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        media: Option<FilePayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        colour: Option<String>,
    },
    None,
}

/// Full message payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(rename = "_id")]
    pub id: Ulid,
    pub channel: Ulid,
    pub author: Ulid,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<FilePayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<EditedTimestampPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<EmbedPayload>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<Ulid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Ulid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masquerade: Option<MasqueradePayload>,
}

/// Reply reference included when sending a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub id: Ulid,
    pub mention: bool,
}

/// Embed shape accepted by the send and edit endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendableEmbedPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

impl Default for SendableEmbedPayload {
    fn default() -> Self {
        Self {
            kind: "Text".to_string(),
            title: None,
            description: None,
            url: None,
            media: None,
            icon_url: None,
            colour: None,
        }
    }
}

/// Body of a message send request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<SendableEmbedPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<ReplyPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masquerade: Option<MasqueradePayload>,
}

/// Body of a message edit request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditMessagePayload {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<SendableEmbedPayload>>,
}

// === Node info ===

/// One optional API feature with its service URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFeaturePayload {
    pub enabled: bool,
    pub url: String,
}

/// Voice service advertisement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceFeaturePayload {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    pub ws: String,
}

/// Feature flags advertised by the node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesPayload {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub invite_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha: Option<ApiFeaturePayload>,
    pub autumn: ApiFeaturePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub january: Option<ApiFeaturePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voso: Option<VoiceFeaturePayload>,
}

/// Root node information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfoPayload {
    pub revolt: String,
    pub features: FeaturesPayload,
    pub ws: String,
    pub app: String,
    pub vapid: String,
}
