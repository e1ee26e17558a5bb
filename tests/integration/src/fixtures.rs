//! Test fixtures - wire payloads and gateway frames
//!
//! Entities are keyed by small integers so tests read as graphs of ids;
//! frame builders wrap payloads in the tagged JSON the socket carries.

use serde::Serialize;
use serde_json::{json, Value};

use ampere_core::{
    ChannelPayload, MemberListPayload, MemberPayload, MessagePayload, ServerPayload, Ulid,
    UserPayload,
};

/// Canonical encoding of a small-integer id
pub fn ulid(n: u128) -> String {
    Ulid::from_u128(n).to_string()
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Payloads
// ============================================================================

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

// ============================================================================
// Gateway frames
// ============================================================================

/// Wrap a payload's fields in a frame carrying the given wire tag
pub fn tagged(tag: &str, payload: impl Serialize) -> Value {
    let mut value = serde_json::to_value(payload).unwrap();
    value["type"] = json!(tag);
    value
}

pub fn ready_frame(
    users: &[UserPayload],
    servers: &[ServerPayload],
    channels: &[ChannelPayload],
    members: &[MemberPayload],
) -> Value {
    json!({
        "type": "Ready",
        "users": users,
        "servers": servers,
        "channels": channels,
        "members": members,
    })
}

pub fn message_frame(payload: &MessagePayload) -> Value {
    tagged("Message", payload)
}

pub fn message_update_frame(n: u128, channel: u128, content: &str) -> Value {
    json!({
        "type": "MessageUpdate",
        "id": ulid(n),
        "channel": ulid(channel),
        "data": { "content": content },
    })
}

pub fn message_delete_frame(n: u128, channel: u128) -> Value {
    json!({
        "type": "MessageDelete",
        "id": ulid(n),
        "channel": ulid(channel),
    })
}

pub fn member_leave_frame(server: u128, user: u128) -> Value {
    json!({
        "type": "ServerMemberLeave",
        "id": ulid(server),
        "user": ulid(user),
    })
}

pub fn member_join_frame(server: u128, user: u128) -> Value {
    json!({
        "type": "ServerMemberJoin",
        "id": ulid(server),
        "user": ulid(user),
    })
}

pub fn channel_update_frame(n: u128, data: Value, clear: &[&str]) -> Value {
    json!({
        "type": "ChannelUpdate",
        "id": ulid(n),
        "data": data,
        "clear": clear,
    })
}
