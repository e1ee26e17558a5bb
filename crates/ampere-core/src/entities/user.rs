//! User entity - represents an account known to the runtime

use chrono::{DateTime, Utc};

use crate::entities::Attachment;
use crate::protocol::events::{UserDataPayload, UserField};
use crate::protocol::payloads::{Presence, ProfilePayload, RelationshipKind, UserPayload};
use crate::value_objects::{Ulid, UserBadges};

/// Presence and status line shown for a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub text: Option<String>,
    pub presence: Option<Presence>,
}

/// Relationship of the local user to another user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub user_id: Ulid,
}

/// Lazily populated profile section of a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub content: Option<String>,
    pub background: Option<Attachment>,
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Ulid,
    pub username: String,
    pub avatar: Option<Attachment>,
    pub badges: UserBadges,
    pub flags: u64,
    pub online: bool,
    pub status: Status,
    pub relationships: Vec<Relationship>,
    pub profile: Profile,
    pub bot: bool,
    pub owner_id: Option<Ulid>,
}

impl User {
    /// Resolve a user from its wire payload
    pub fn from_payload(payload: UserPayload) -> Self {
        let (bot, owner_id) = match payload.bot {
            Some(info) => (true, Some(info.owner)),
            None => (false, None),
        };
        let status = payload
            .status
            .map(|status| Status {
                text: status.text,
                presence: status.presence,
            })
            .unwrap_or_default();
        let relationships = payload
            .relations
            .unwrap_or_default()
            .into_iter()
            .map(|relation| Relationship {
                kind: relation.status,
                user_id: relation.id,
            })
            .collect();

        Self {
            id: payload.id,
            username: payload.username,
            avatar: payload.avatar.map(Attachment::from_payload),
            badges: payload.badges.unwrap_or_default(),
            flags: payload.flags.unwrap_or_default(),
            online: payload.online,
            status,
            relationships,
            profile: Profile::default(),
            bot,
            owner_id,
        }
    }

    /// Apply a partial update frame: clears first, then sparse data
    pub fn apply_update(&mut self, data: &UserDataPayload, clear: &[UserField]) {
        for field in clear {
            match field {
                UserField::Avatar => self.avatar = None,
                UserField::StatusText => self.status.text = None,
                UserField::ProfileContent => self.profile.content = None,
                UserField::ProfileBackground => self.profile.background = None,
            }
        }

        if let Some(username) = &data.username {
            self.username = username.clone();
        }
        if let Some(status) = &data.status {
            self.status = Status {
                text: status.text.clone(),
                presence: status.presence,
            };
        }
        if let Some(avatar) = &data.avatar {
            self.avatar = Some(Attachment::from_payload(avatar.clone()));
        }
        if let Some(badges) = data.badges {
            self.badges = badges;
        }
        if let Some(flags) = data.flags {
            self.flags = flags;
        }
        if let Some(online) = data.online {
            self.online = online;
        }
        if let Some(content) = &data.profile_content {
            self.profile.content = Some(content.clone());
        }
        if let Some(background) = &data.profile_background {
            self.profile.background = Some(Attachment::from_payload(background.clone()));
        }
    }

    /// Overwrite the profile section with a freshly fetched one
    pub fn set_profile(&mut self, payload: ProfilePayload) {
        self.profile = Profile {
            content: payload.content,
            background: payload.background.map(Attachment::from_payload),
        };
    }

    /// Relationship of the local user to this user, if known
    pub fn relationship_with(&self, user_id: Ulid) -> Option<RelationshipKind> {
        self.relationships
            .iter()
            .find(|relation| relation.user_id == user_id)
            .map(|relation| relation.kind)
    }

    /// Mention markup for this user
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// When the account was created, derived from its id
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}
