//! Wire protocol types shared by the REST and gateway transports

pub mod events;
pub mod payloads;

pub use events::{
    ChannelDataPayload, ChannelField, ClientEvent, MemberDataPayload, MemberField,
    MessageEditDataPayload, RoleDataPayload, RoleField, ServerDataPayload, ServerEvent,
    ServerField, UserDataPayload, UserField,
};
pub use payloads::{
    ApiFeaturePayload, ApiInfoPayload, BotInfoPayload, CategoryPayload, ChannelPayload,
    EditMessagePayload, EditedTimestampPayload, EmbedImagePayload, EmbedImageSize, EmbedPayload,
    EmbedVideoPayload, FeaturesPayload, FileKind, FileMetadataPayload, FilePayload,
    MasqueradePayload, MemberIdPayload, MemberListPayload, MemberPayload, MessagePayload, Presence,
    ProfilePayload, RelationPayload, RelationshipKind, ReplyPayload, RolePayload,
    SendMessagePayload, SendableEmbedPayload, ServerPayload, SpecialEmbedPayload, StatusPayload,
    SystemMessagesPayload, UploadedFilePayload, UserPayload, VoiceFeaturePayload,
};
