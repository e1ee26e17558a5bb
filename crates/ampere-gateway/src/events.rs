//! Application events - what listeners subscribe to
//!
//! Update events carry the pre-update snapshot next to the live handle so
//! callbacks can diff. Delete events carry the orphaned instance, which
//! stays readable but is no longer reachable through the store.

use ampere_core::{
    Channel, Member, Message, RelationshipKind, Role, Server, SharedChannel, SharedMember,
    SharedMessage, SharedServer, SharedUser, Ulid, User,
};

/// An event raised to application listeners
#[derive(Clone)]
pub enum Event {
    /// The bootstrap snapshot has been applied and the connection is live
    Ready,

    Message(SharedMessage),
    MessageUpdate {
        old: Message,
        message: SharedMessage,
    },
    MessageDelete {
        message: SharedMessage,
    },

    ChannelCreate(SharedChannel),
    ChannelUpdate {
        old: Channel,
        channel: SharedChannel,
    },
    ChannelDelete {
        channel: SharedChannel,
    },
    TypingStart {
        channel: SharedChannel,
        user: SharedUser,
    },
    TypingStop {
        channel: SharedChannel,
        user: SharedUser,
    },

    /// The local account joined a server and its graph is cached
    ServerAdded(SharedServer),
    ServerUpdate {
        old: Server,
        server: SharedServer,
    },
    /// The server was deleted or the local account left it
    ServerRemoved {
        server: SharedServer,
    },

    MemberJoin(SharedMember),
    MemberUpdate {
        old: Member,
        member: SharedMember,
    },
    MemberLeave {
        member: SharedMember,
    },

    RoleUpdate {
        server: SharedServer,
        role_id: Ulid,
        old: Option<Role>,
    },
    RoleDelete {
        server: SharedServer,
        role: Role,
    },

    UserUpdate {
        old: User,
        user: SharedUser,
    },
    UserRelationship {
        user: SharedUser,
        status: RelationshipKind,
    },
}

impl Event {
    /// The name listeners register under
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Message(_) => "message",
            Self::MessageUpdate { .. } => "message_update",
            Self::MessageDelete { .. } => "message_delete",
            Self::ChannelCreate(_) => "channel_create",
            Self::ChannelUpdate { .. } => "channel_update",
            Self::ChannelDelete { .. } => "channel_delete",
            Self::TypingStart { .. } => "typing_start",
            Self::TypingStop { .. } => "typing_stop",
            Self::ServerAdded(_) => "server_added",
            Self::ServerUpdate { .. } => "server_update",
            Self::ServerRemoved { .. } => "server_removed",
            Self::MemberJoin(_) => "member_join",
            Self::MemberUpdate { .. } => "member_update",
            Self::MemberLeave { .. } => "member_leave",
            Self::RoleUpdate { .. } => "role_update",
            Self::RoleDelete { .. } => "role_delete",
            Self::UserUpdate { .. } => "user_update",
            Self::UserRelationship { .. } => "user_relationship",
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event").field("name", &self.name()).finish()
    }
}
