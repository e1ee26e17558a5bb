//! In-memory transport stub and payload fixtures for store tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use ampere_core::{
    ApiInfoPayload, ChannelPayload, EditMessagePayload, MemberListPayload, MemberPayload,
    MessagePayload, MessageQuery, ProfilePayload, SendMessagePayload, ServerPayload, Transport,
    TransportError, TransportResult, Ulid, UploadedFilePayload, UserPayload,
};

/// Transport double that serves canned payloads and panics on anything
/// the test did not arrange, so cache hits prove no network round trip.
#[derive(Clone, Default)]
pub(crate) struct StubTransport {
    users: Arc<Mutex<HashMap<Ulid, UserPayload>>>,
    channels: Arc<Mutex<HashMap<Ulid, ChannelPayload>>>,
    servers: Arc<Mutex<HashMap<Ulid, ServerPayload>>>,
    members: Arc<Mutex<HashMap<(Ulid, Ulid), MemberPayload>>>,
    member_lists: Arc<Mutex<HashMap<Ulid, MemberListPayload>>>,
    profiles: Arc<Mutex<HashMap<Ulid, ProfilePayload>>>,
    dms: Arc<Mutex<HashMap<Ulid, ChannelPayload>>>,
    gone_members: Arc<Mutex<HashSet<(Ulid, Ulid)>>>,
    gone_channels: Arc<Mutex<HashSet<Ulid>>>,
    pub user_calls: Arc<AtomicUsize>,
    pub member_calls: Arc<AtomicUsize>,
    pub member_list_calls: Arc<AtomicUsize>,
    pub dm_calls: Arc<AtomicUsize>,
}

impl StubTransport {
    pub fn put_user(&self, payload: UserPayload) {
        self.users.lock().insert(payload.id, payload);
    }

    pub fn put_channel(&self, payload: ChannelPayload) {
        self.channels.lock().insert(payload.id(), payload);
    }

    pub fn put_server(&self, payload: ServerPayload) {
        self.servers.lock().insert(payload.id, payload);
    }

    pub fn put_member(&self, payload: MemberPayload) {
        self.members
            .lock()
            .insert((payload.id.server, payload.id.user), payload);
    }

    pub fn put_member_list(&self, server: u128, payload: MemberListPayload) {
        self.member_lists
            .lock()
            .insert(Ulid::from_u128(server), payload);
    }

    pub fn put_profile(&self, user: u128, payload: ProfilePayload) {
        self.profiles.lock().insert(Ulid::from_u128(user), payload);
    }

    pub fn put_dm(&self, peer: u128, payload: ChannelPayload) {
        self.dms.lock().insert(Ulid::from_u128(peer), payload);
    }

    pub fn missing_member(&self, server: u128, user: u128) {
        self.gone_members
            .lock()
            .insert((Ulid::from_u128(server), Ulid::from_u128(user)));
    }

    pub fn missing_channel(&self, channel: u128) {
        self.gone_channels.lock().insert(Ulid::from_u128(channel));
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_api_info(&self) -> TransportResult<ApiInfoPayload> {
        panic!("unexpected get_api_info call");
    }

    async fn fetch_self(&self) -> TransportResult<UserPayload> {
        panic!("unexpected fetch_self call");
    }

    async fn fetch_user(&self, user_id: Ulid) -> TransportResult<UserPayload> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.users.lock().get(&user_id) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected fetch_user({user_id}) call"),
        }
    }

    async fn fetch_user_profile(&self, user_id: Ulid) -> TransportResult<ProfilePayload> {
        match self.profiles.lock().get(&user_id) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected fetch_user_profile({user_id}) call"),
        }
    }

    async fn open_dm(&self, user_id: Ulid) -> TransportResult<ChannelPayload> {
        self.dm_calls.fetch_add(1, Ordering::SeqCst);
        match self.dms.lock().get(&user_id) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected open_dm({user_id}) call"),
        }
    }

    async fn fetch_server(&self, server_id: Ulid) -> TransportResult<ServerPayload> {
        match self.servers.lock().get(&server_id) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected fetch_server({server_id}) call"),
        }
    }

    async fn fetch_member(
        &self,
        server_id: Ulid,
        user_id: Ulid,
    ) -> TransportResult<MemberPayload> {
        self.member_calls.fetch_add(1, Ordering::SeqCst);
        if self.gone_members.lock().contains(&(server_id, user_id)) {
            return Err(TransportError::Status { status: 404 });
        }
        match self.members.lock().get(&(server_id, user_id)) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected fetch_member({server_id}, {user_id}) call"),
        }
    }

    async fn fetch_members(&self, server_id: Ulid) -> TransportResult<MemberListPayload> {
        self.member_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .member_lists
            .lock()
            .get(&server_id)
            .cloned()
            .unwrap_or(MemberListPayload {
                members: Vec::new(),
                users: Vec::new(),
            }))
    }

    async fn fetch_channel(&self, channel_id: Ulid) -> TransportResult<ChannelPayload> {
        if self.gone_channels.lock().contains(&channel_id) {
            return Err(TransportError::Status { status: 404 });
        }
        match self.channels.lock().get(&channel_id) {
            Some(payload) => Ok(payload.clone()),
            None => panic!("unexpected fetch_channel({channel_id}) call"),
        }
    }

    async fn fetch_message(
        &self,
        _channel_id: Ulid,
        message_id: Ulid,
    ) -> TransportResult<MessagePayload> {
        panic!("unexpected fetch_message({message_id}) call");
    }

    async fn fetch_messages(
        &self,
        channel_id: Ulid,
        _query: MessageQuery,
    ) -> TransportResult<Vec<MessagePayload>> {
        panic!("unexpected fetch_messages({channel_id}) call");
    }

    async fn send_message(
        &self,
        channel_id: Ulid,
        _body: &SendMessagePayload,
    ) -> TransportResult<MessagePayload> {
        panic!("unexpected send_message({channel_id}) call");
    }

    async fn edit_message(
        &self,
        _channel_id: Ulid,
        message_id: Ulid,
        _body: &EditMessagePayload,
    ) -> TransportResult<()> {
        panic!("unexpected edit_message({message_id}) call");
    }

    async fn delete_message(&self, _channel_id: Ulid, message_id: Ulid) -> TransportResult<()> {
        panic!("unexpected delete_message({message_id}) call");
    }

    async fn upload_file(
        &self,
        filename: &str,
        _bytes: Vec<u8>,
        _tag: &str,
    ) -> TransportResult<UploadedFilePayload> {
        panic!("unexpected upload_file({filename}) call");
    }
}

/// Hand-rolled wire payloads keyed by small integers
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    fn ulid(n: u128) -> String {
        Ulid::from_u128(n).to_string()
    }

    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    pub fn user(n: u128, username: &str) -> UserPayload {
        decode(json!({
            "_id": ulid(n),
            "username": username,
            "online": true,
        }))
    }

    pub fn server(n: u128, owner: u128, channels: &[u128]) -> ServerPayload {
        let channels: Vec<String> = channels.iter().map(|c| ulid(*c)).collect();
        decode(json!({
            "_id": ulid(n),
            "name": format!("server-{n}"),
            "owner": ulid(owner),
            "channels": channels,
            "default_permissions": [0, 0],
        }))
    }

    pub fn member(server: u128, user: u128) -> MemberPayload {
        decode(json!({
            "_id": { "server": ulid(server), "user": ulid(user) },
        }))
    }

    pub fn member_list(entries: &[(u128, u128, &str)]) -> MemberListPayload {
        MemberListPayload {
            members: entries.iter().map(|(s, u, _)| member(*s, *u)).collect(),
            users: entries.iter().map(|(_, u, name)| user(*u, name)).collect(),
        }
    }

    pub fn profile(content: &str) -> ProfilePayload {
        ProfilePayload {
            content: Some(content.to_string()),
            background: None,
        }
    }

    pub fn text_channel(n: u128, server: u128, name: &str) -> ChannelPayload {
        decode(json!({
            "channel_type": "TextChannel",
            "_id": ulid(n),
            "server": ulid(server),
            "name": name,
        }))
    }

    pub fn group_channel(n: u128, recipients: &[u128]) -> ChannelPayload {
        let recipients: Vec<String> = recipients.iter().map(|r| ulid(*r)).collect();
        decode(json!({
            "channel_type": "Group",
            "_id": ulid(n),
            "recipients": recipients,
            "name": format!("group-{n}"),
            "owner": recipients.first().cloned().unwrap_or_else(|| ulid(0)),
        }))
    }

    pub fn dm_channel(n: u128, recipients: &[u128]) -> ChannelPayload {
        let recipients: Vec<String> = recipients.iter().map(|r| ulid(*r)).collect();
        decode(json!({
            "channel_type": "DirectMessage",
            "_id": ulid(n),
            "active": true,
            "recipients": recipients,
        }))
    }

    pub fn message(n: u128, channel: u128, author: u128, content: &str) -> MessagePayload {
        decode(json!({
            "_id": ulid(n),
            "channel": ulid(channel),
            "author": ulid(author),
            "content": content,
        }))
    }

    pub fn system_message(n: u128, channel: u128, content: &str) -> MessagePayload {
        decode(json!({
            "_id": ulid(n),
            "channel": ulid(channel),
            "author": Ulid::ZERO.to_string(),
            "content": content,
        }))
    }
}
