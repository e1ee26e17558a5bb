//! Message entity - a chat message resolved against the cache

use chrono::{DateTime, Utc};

use crate::entities::{Attachment, SharedChannel, SharedMember, SharedMessage, SharedUser};
use crate::protocol::events::MessageEditDataPayload;
use crate::protocol::payloads::{EmbedPayload, MasqueradePayload, MessagePayload};
use crate::value_objects::Ulid;

/// Author of a message, resolved to the richest form the cache allows
#[derive(Debug, Clone)]
pub enum MessageAuthor {
    /// Sent in a server channel by a cached member
    Member(SharedMember),
    /// Sent outside a server, or by a user with no cached membership
    User(SharedUser),
    /// Synthesized by the platform itself
    System,
}

impl MessageAuthor {
    /// Check if the platform authored this message
    #[inline]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

/// Per-message name and avatar override
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Masquerade {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl Masquerade {
    fn from_payload(payload: MasqueradePayload) -> Self {
        Self {
            name: payload.name,
            avatar: payload.avatar,
        }
    }
}

/// Message entity
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Ulid,
    pub channel_id: Ulid,
    pub author_id: Ulid,
    pub channel: SharedChannel,
    pub author: MessageAuthor,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub embeds: Vec<EmbedPayload>,
    pub mention_ids: Vec<Ulid>,
    pub reply_ids: Vec<Ulid>,
    pub replies: Vec<SharedMessage>,
    pub masquerade: Option<Masquerade>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Assemble a message from its payload and the references the
    /// cache resolved for it. Replies are best effort: ids the cache
    /// no longer holds stay in `reply_ids` only.
    pub fn from_parts(
        payload: MessagePayload,
        channel: SharedChannel,
        author: MessageAuthor,
        replies: Vec<SharedMessage>,
    ) -> Self {
        Self {
            id: payload.id,
            channel_id: payload.channel,
            author_id: payload.author,
            channel,
            author,
            content: payload.content,
            attachments: payload
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(Attachment::from_payload)
                .collect(),
            embeds: payload.embeds.unwrap_or_default(),
            mention_ids: payload.mentions.unwrap_or_default(),
            reply_ids: payload.replies.unwrap_or_default(),
            replies,
            masquerade: payload.masquerade.map(Masquerade::from_payload),
            edited_at: payload.edited.map(|edited| edited.date),
        }
    }

    /// Apply an edit frame to the cached message
    pub fn apply_edit(&mut self, data: &MessageEditDataPayload) {
        if let Some(content) = &data.content {
            self.content = content.clone();
        }
        if let Some(edited) = data.edited {
            self.edited_at = Some(edited.date);
        }
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        !self.reply_ids.is_empty()
    }

    /// Check if the platform authored this message
    #[inline]
    pub fn is_system(&self) -> bool {
        self.author.is_system() || self.author_id.is_zero()
    }

    /// Name to display for the author, masquerade first
    #[must_use]
    pub fn author_display_name(&self) -> String {
        if let Some(masquerade) = &self.masquerade {
            if let Some(name) = &masquerade.name {
                return name.clone();
            }
        }
        match &self.author {
            MessageAuthor::Member(member) => member.read().display_name(),
            MessageAuthor::User(user) => user.read().username.clone(),
            MessageAuthor::System => "System".to_string(),
        }
    }

    /// When the message was sent, derived from its id
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}
