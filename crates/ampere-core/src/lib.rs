//! # ampere-core
//!
//! Domain layer containing entities, the ULID identifier type, wire payloads,
//! the gateway event sum type, and the transport trait. This crate has zero
//! dependencies on infrastructure (HTTP client, socket, runtime internals).

pub mod entities;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    shared, Attachment, Category, Channel, ChannelKind, Masquerade, Member, Message,
    MessageAuthor, Profile, Relationship, Role, Server, Shared, SharedChannel, SharedMember,
    SharedMessage, SharedServer, SharedUser, Status, SystemMessageChannels, User,
};
pub use error::{TransportError, TransportResult};
pub use protocol::{
    ApiInfoPayload, ChannelDataPayload, ChannelField, ChannelPayload, ClientEvent,
    EditMessagePayload, MemberDataPayload, MemberField, MemberIdPayload, MemberListPayload,
    MemberPayload, MessageEditDataPayload, MessagePayload, Presence, ProfilePayload,
    RelationshipKind, RoleDataPayload, RoleField, SendMessagePayload, ServerDataPayload,
    ServerEvent, ServerField, ServerPayload, UploadedFilePayload, UserDataPayload, UserField,
    UserPayload,
};
pub use traits::{MessageQuery, MessageSort, Transport};
pub use value_objects::{
    ChannelPermissions, PermissionPair, ServerPermissions, Ulid, UlidDecodeError, UlidGenerator,
    UserBadges,
};
