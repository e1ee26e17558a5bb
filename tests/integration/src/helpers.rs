//! Test helpers - a loopback gateway node and a canned REST transport
//!
//! `TestNode` binds a WebSocket server on an ephemeral loopback port,
//! accepts one session, answers the Authenticate frame, and then relays
//! whatever frames a test queues. `MockTransport` cans the REST side so
//! fetch-or-create paths resolve without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use ampere_core::{
    ApiInfoPayload, ChannelPayload, EditMessagePayload, MemberListPayload, MemberPayload,
    MessagePayload, MessageQuery, ProfilePayload, SendMessagePayload, ServerPayload, Transport,
    TransportError, TransportResult, Ulid, UploadedFilePayload, UserPayload,
};

// ============================================================================
// Loopback gateway node
// ============================================================================

/// How the node answers the Authenticate frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeVerdict {
    Accept,
    Reject,
}

/// A single-session WebSocket server on a loopback port
pub struct TestNode {
    pub url: String,
    outbound: mpsc::UnboundedSender<String>,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    _handle: JoinHandle<()>,
}

impl TestNode {
    /// Bind a node that authenticates any token
    pub async fn start() -> Self {
        Self::start_with(NodeVerdict::Accept).await
    }

    /// Bind a node that rejects the session during the handshake
    pub async fn start_rejecting() -> Self {
        Self::start_with(NodeVerdict::Reject).await
    }

    async fn start_with(verdict: NodeVerdict) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("ws://{addr}");
        let (outbound, mut queued) = mpsc::unbounded_channel::<String>();
        let received = Arc::new(Mutex::new(Vec::new()));
        let record = received.clone();

        let handle = tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(socket) = accept_async(stream).await else {
                return;
            };
            let (mut sink, mut stream) = socket.split();
            loop {
                tokio::select! {
                    frame = queued.recv() => match frame {
                        Some(text) => {
                            if sink.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let Ok(value) = serde_json::from_str::<serde_json::Value>(&text)
                            else {
                                continue;
                            };
                            let tag = value
                                .get("type")
                                .and_then(|t| t.as_str())
                                .unwrap_or_default()
                                .to_string();
                            record.lock().push(value);
                            if tag == "Authenticate" {
                                let reply = match verdict {
                                    NodeVerdict::Accept => r#"{"type":"Authenticated"}"#,
                                    NodeVerdict::Reject => {
                                        r#"{"type":"Error","error":"InvalidSession"}"#
                                    }
                                };
                                if sink.send(Message::Text(reply.to_string())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(_)) => break,
                    },
                }
            }
        });

        Self {
            url,
            outbound,
            received,
            _handle: handle,
        }
    }

    /// Queue a frame for the connected client
    pub fn send(&self, frame: serde_json::Value) {
        self.outbound
            .send(frame.to_string())
            .expect("node task is gone");
    }

    /// Wire tags of every frame the client sent, in order
    pub fn sent_tags(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .filter_map(|frame| frame.get("type").and_then(|t| t.as_str()))
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Canned REST transport
// ============================================================================

/// In-memory transport; fetches resolve from canned maps or report 404
#[derive(Clone, Default)]
pub struct MockTransport {
    users: Arc<Mutex<HashMap<Ulid, UserPayload>>>,
    channels: Arc<Mutex<HashMap<Ulid, ChannelPayload>>>,
    servers: Arc<Mutex<HashMap<Ulid, ServerPayload>>>,
    members: Arc<Mutex<HashMap<(Ulid, Ulid), MemberPayload>>>,
    member_lists: Arc<Mutex<HashMap<Ulid, MemberListPayload>>>,
    pub user_calls: Arc<AtomicUsize>,
    pub channel_calls: Arc<AtomicUsize>,
    pub server_calls: Arc<AtomicUsize>,
    pub member_list_calls: Arc<AtomicUsize>,
}

impl MockTransport {
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
}

fn not_found() -> TransportError {
    TransportError::Status { status: 404 }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_api_info(&self) -> TransportResult<ApiInfoPayload> {
        panic!("unexpected get_api_info call");
    }

    async fn fetch_self(&self) -> TransportResult<UserPayload> {
        panic!("unexpected fetch_self call");
    }

    async fn fetch_user(&self, user_id: Ulid) -> TransportResult<UserPayload> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users.lock().get(&user_id).cloned().ok_or_else(not_found)
    }

    async fn fetch_user_profile(&self, _user_id: Ulid) -> TransportResult<ProfilePayload> {
        panic!("unexpected fetch_user_profile call");
    }

    async fn open_dm(&self, user_id: Ulid) -> TransportResult<ChannelPayload> {
        panic!("unexpected open_dm({user_id}) call");
    }

    async fn fetch_server(&self, server_id: Ulid) -> TransportResult<ServerPayload> {
        self.server_calls.fetch_add(1, Ordering::SeqCst);
        self.servers
            .lock()
            .get(&server_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_member(
        &self,
        server_id: Ulid,
        user_id: Ulid,
    ) -> TransportResult<MemberPayload> {
        self.members
            .lock()
            .get(&(server_id, user_id))
            .cloned()
            .ok_or_else(not_found)
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
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .get(&channel_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_message(
        &self,
        _channel_id: Ulid,
        _message_id: Ulid,
    ) -> TransportResult<MessagePayload> {
        Err(not_found())
    }

    async fn fetch_messages(
        &self,
        _channel_id: Ulid,
        _query: MessageQuery,
    ) -> TransportResult<Vec<MessagePayload>> {
        panic!("unexpected fetch_messages call");
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
