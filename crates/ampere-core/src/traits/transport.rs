//! Transport trait (port) - defines what the runtime needs from the REST API
//!
//! The cache and client layers depend on this trait, never on a
//! concrete HTTP client. Tests substitute an in-memory transport to
//! drive the runtime without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;
use crate::protocol::payloads::{
    ApiInfoPayload, ChannelPayload, EditMessagePayload, MemberListPayload, MemberPayload,
    MessagePayload, ProfilePayload, SendMessagePayload, ServerPayload, UploadedFilePayload,
    UserPayload,
};
use crate::value_objects::Ulid;

/// Order applied to a message history fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSort {
    Latest,
    Oldest,
    Relevance,
}

/// Query parameters accepted by the message history endpoint
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MessageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<MessageSort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Ulid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby: Option<Ulid>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    // =========================================================================
    // Node
    // =========================================================================

    /// Fetch node information from the API root
    async fn get_api_info(&self) -> TransportResult<ApiInfoPayload>;

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch the account the token belongs to
    async fn fetch_self(&self) -> TransportResult<UserPayload>;

    /// Fetch a user by id
    async fn fetch_user(&self, user_id: Ulid) -> TransportResult<UserPayload>;

    /// Fetch a user's profile section
    async fn fetch_user_profile(&self, user_id: Ulid) -> TransportResult<ProfilePayload>;

    /// Open (or retrieve) the DM channel with a user
    async fn open_dm(&self, user_id: Ulid) -> TransportResult<ChannelPayload>;

    // =========================================================================
    // Servers
    // =========================================================================

    /// Fetch a server by id
    async fn fetch_server(&self, server_id: Ulid) -> TransportResult<ServerPayload>;

    /// Fetch one member of a server
    async fn fetch_member(&self, server_id: Ulid, user_id: Ulid)
        -> TransportResult<MemberPayload>;

    /// Fetch the full member list of a server, with the users backing it
    async fn fetch_members(&self, server_id: Ulid) -> TransportResult<MemberListPayload>;

    // =========================================================================
    // Channels
    // =========================================================================

    /// Fetch a channel by id
    async fn fetch_channel(&self, channel_id: Ulid) -> TransportResult<ChannelPayload>;

    // =========================================================================
    // Messages
    // =========================================================================

    /// Fetch a single message
    async fn fetch_message(
        &self,
        channel_id: Ulid,
        message_id: Ulid,
    ) -> TransportResult<MessagePayload>;

    /// Fetch message history for a channel
    async fn fetch_messages(
        &self,
        channel_id: Ulid,
        query: MessageQuery,
    ) -> TransportResult<Vec<MessagePayload>>;

    /// Send a message to a channel
    async fn send_message(
        &self,
        channel_id: Ulid,
        body: &SendMessagePayload,
    ) -> TransportResult<MessagePayload>;

    /// Edit a message in place
    async fn edit_message(
        &self,
        channel_id: Ulid,
        message_id: Ulid,
        body: &EditMessagePayload,
    ) -> TransportResult<()>;

    /// Delete a message
    async fn delete_message(&self, channel_id: Ulid, message_id: Ulid) -> TransportResult<()>;

    // =========================================================================
    // Files
    // =========================================================================

    /// Upload a file to the CDN, returning its id
    async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        tag: &str,
    ) -> TransportResult<UploadedFilePayload>;
}
