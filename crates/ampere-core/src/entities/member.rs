//! Member entity - a user's membership in one server
//!
//! A member never duplicates user state. It holds a handle to the
//! shared user plus the per-server overrides, and derives display
//! values from the pair on read.

use crate::entities::{Attachment, SharedUser};
use crate::protocol::events::{MemberDataPayload, MemberField};
use crate::protocol::payloads::MemberPayload;
use crate::value_objects::Ulid;

/// Server member entity (junction between User and Server)
#[derive(Debug, Clone)]
pub struct Member {
    pub user: SharedUser,
    pub user_id: Ulid,
    pub server_id: Ulid,
    pub nickname: Option<String>,
    pub server_avatar: Option<Attachment>,
    pub role_ids: Vec<Ulid>,
}

impl Member {
    /// Resolve a member from its wire payload and the shared user it wraps
    pub fn from_payload(payload: MemberPayload, user: SharedUser) -> Self {
        Self {
            user,
            user_id: payload.id.user,
            server_id: payload.id.server,
            nickname: payload.nickname,
            server_avatar: payload.avatar.map(Attachment::from_payload),
            role_ids: payload.roles.unwrap_or_default(),
        }
    }

    /// Apply a partial update frame: clears first, then sparse data
    pub fn apply_update(&mut self, data: &MemberDataPayload, clear: &[MemberField]) {
        for field in clear {
            match field {
                MemberField::Nickname => self.nickname = None,
                MemberField::Avatar => self.server_avatar = None,
            }
        }

        if let Some(nickname) = &data.nickname {
            self.nickname = Some(nickname.clone());
        }
        if let Some(avatar) = &data.avatar {
            self.server_avatar = Some(Attachment::from_payload(avatar.clone()));
        }
        if let Some(roles) = &data.roles {
            self.role_ids = roles.clone();
        }
    }

    /// Name shown for this member (nickname if set, otherwise username)
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(nickname) => nickname.clone(),
            None => self.user.read().username.clone(),
        }
    }

    /// Avatar shown for this member (server override, otherwise user avatar)
    #[must_use]
    pub fn display_avatar(&self) -> Option<Attachment> {
        match &self.server_avatar {
            Some(avatar) => Some(avatar.clone()),
            None => self.user.read().avatar.clone(),
        }
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Ulid) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Mention markup for the underlying user
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}
