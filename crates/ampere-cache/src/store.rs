//! Entity store - authoritative in-memory map per entity kind
//!
//! Holds at most one live instance per (kind, id). Mutation happens in place
//! behind the shared lock so references held by callbacks stay current, and
//! deletion only unlinks the entry, turning held references into orphaned
//! snapshots. The message map is bounded, evicting in insertion order.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use ampere_core::{
    shared, Channel, ChannelDataPayload, ChannelField, ChannelKind, ChannelPayload, Member,
    MemberDataPayload, MemberField, MemberPayload, Message, MessageAuthor, MessageEditDataPayload,
    MessagePayload, Role, RoleDataPayload, RoleField, Server, ServerDataPayload, ServerField,
    ServerPayload, SharedChannel, SharedMember, SharedMessage, SharedServer, SharedUser,
    Transport, Ulid, User, UserDataPayload, UserField, UserPayload,
};

use crate::error::{EntityKind, StoreError, StoreResult};

/// Key for deduplicating concurrent network fetches of the same entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlightKey {
    User(Ulid),
    Channel(Ulid),
    Server(Ulid),
    Member(Ulid, Ulid),
    Message(Ulid),
    DirectMessage(Ulid),
}

/// In-memory entity cache backed by the REST transport for misses
pub struct Store {
    transport: Arc<dyn Transport>,
    message_limit: usize,
    users: DashMap<Ulid, SharedUser>,
    channels: DashMap<Ulid, SharedChannel>,
    servers: DashMap<Ulid, SharedServer>,
    members: DashMap<Ulid, DashMap<Ulid, SharedMember>>,
    messages: DashMap<Ulid, SharedMessage>,
    message_order: Mutex<VecDeque<Ulid>>,
    dm_channels: DashMap<Ulid, Ulid>,
    self_id: RwLock<Option<Ulid>>,
    in_flight: DashMap<FlightKey, Arc<tokio::sync::Mutex<()>>>,
}

impl Store {
    pub fn new(transport: Arc<dyn Transport>, message_limit: usize) -> Self {
        Self {
            transport,
            message_limit,
            users: DashMap::new(),
            channels: DashMap::new(),
            servers: DashMap::new(),
            members: DashMap::new(),
            messages: DashMap::new(),
            message_order: Mutex::new(VecDeque::new()),
            dm_channels: DashMap::new(),
            self_id: RwLock::new(None),
            in_flight: DashMap::new(),
        }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Record the id of the account this runtime is logged in as
    pub fn set_self_id(&self, id: Ulid) {
        *self.self_id.write() = Some(id);
    }

    #[must_use]
    pub fn self_id(&self) -> Option<Ulid> {
        *self.self_id.read()
    }

    /// Check whether an id refers to the logged-in account
    #[must_use]
    pub fn is_self(&self, id: Ulid) -> bool {
        self.self_id() == Some(id)
    }

    // =========================================================================
    // Lookups (no network)
    // =========================================================================

    pub fn get_user(&self, id: Ulid) -> StoreResult<SharedUser> {
        self.users
            .get(&id)
            .map(|user| user.value().clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::User,
                id,
            })
    }

    pub fn get_channel(&self, id: Ulid) -> StoreResult<SharedChannel> {
        self.channels
            .get(&id)
            .map(|channel| channel.value().clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Channel,
                id,
            })
    }

    pub fn get_server(&self, id: Ulid) -> StoreResult<SharedServer> {
        self.servers
            .get(&id)
            .map(|server| server.value().clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Server,
                id,
            })
    }

    pub fn get_member(&self, server_id: Ulid, user_id: Ulid) -> StoreResult<SharedMember> {
        self.members
            .get(&server_id)
            .and_then(|bucket| bucket.get(&user_id).map(|member| member.value().clone()))
            .ok_or(StoreError::MemberNotFound { server_id, user_id })
    }

    pub fn get_message(&self, id: Ulid) -> StoreResult<SharedMessage> {
        self.messages
            .get(&id)
            .map(|message| message.value().clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Message,
                id,
            })
    }

    /// Look up the direct-message channel shared with a peer
    pub fn get_dm_channel(&self, peer_id: Ulid) -> StoreResult<SharedChannel> {
        let channel_id = self
            .dm_channels
            .get(&peer_id)
            .map(|entry| *entry.value())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Channel,
                id: peer_id,
            })?;
        self.get_channel(channel_id)
    }

    /// Members cached for one server, in no particular order
    #[must_use]
    pub fn server_members(&self, server_id: Ulid) -> Vec<SharedMember> {
        self.members
            .get(&server_id)
            .map(|bucket| bucket.iter().map(|member| member.value().clone()).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn servers(&self) -> Vec<SharedServer> {
        self.servers.iter().map(|s| s.value().clone()).collect()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    // =========================================================================
    // Idempotent inserts
    // =========================================================================

    /// Insert a user unless one with the same id is already live
    pub fn add_user(&self, payload: UserPayload) -> SharedUser {
        let id = payload.id;
        self.users
            .entry(id)
            .or_insert_with(|| shared(User::from_payload(payload)))
            .value()
            .clone()
    }

    /// Insert a channel unless one with the same id is already live
    pub fn add_channel(&self, payload: ChannelPayload) -> SharedChannel {
        let id = payload.id();
        let channel = self
            .channels
            .entry(id)
            .or_insert_with(|| shared(Channel::from_payload(payload)))
            .value()
            .clone();
        self.index_direct_message(id, &channel);
        channel
    }

    /// Insert a server unless one with the same id is already live
    ///
    /// Channels the server references are not resolved here; that network
    /// pass belongs to [`Store::hydrate_server`].
    pub fn add_server(&self, payload: ServerPayload) -> SharedServer {
        let id = payload.id;
        let server = self
            .servers
            .entry(id)
            .or_insert_with(|| shared(Server::from_payload(payload)))
            .value()
            .clone();
        self.members.entry(id).or_default();
        server
    }

    /// Insert a member unless one with the same key is already live
    ///
    /// The referenced user and server must already be cached so the member
    /// can point at the live instances.
    pub fn add_member(&self, payload: MemberPayload) -> StoreResult<SharedMember> {
        let server_id = payload.id.server;
        let user_id = payload.id.user;
        let user = self.get_user(user_id)?;
        self.get_server(server_id)?;
        let member = self
            .members
            .entry(server_id)
            .or_default()
            .entry(user_id)
            .or_insert_with(|| shared(Member::from_payload(payload, user)))
            .value()
            .clone();
        Ok(member)
    }

    // =========================================================================
    // Fetch-or-create (network on miss, deduplicated per key)
    // =========================================================================

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn fetch_user(&self, id: Ulid) -> StoreResult<SharedUser> {
        if let Ok(user) = self.get_user(id) {
            return Ok(user);
        }
        let key = FlightKey::User(id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(user) = self.get_user(id) {
            return Ok(user);
        }
        let fetched = self.transport.fetch_user(id).await;
        self.in_flight.remove(&key);
        Ok(self.add_user(fetched?))
    }

    #[instrument(skip(self), fields(channel_id = %id))]
    pub async fn fetch_channel(&self, id: Ulid) -> StoreResult<SharedChannel> {
        if let Ok(channel) = self.get_channel(id) {
            return Ok(channel);
        }
        let key = FlightKey::Channel(id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(channel) = self.get_channel(id) {
            return Ok(channel);
        }
        let fetched = self.transport.fetch_channel(id).await;
        self.in_flight.remove(&key);
        Ok(self.add_channel(fetched?))
    }

    #[instrument(skip(self), fields(server_id = %id))]
    pub async fn fetch_server(&self, id: Ulid) -> StoreResult<SharedServer> {
        if let Ok(server) = self.get_server(id) {
            return Ok(server);
        }
        let key = FlightKey::Server(id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(server) = self.get_server(id) {
            return Ok(server);
        }
        let fetched = self.transport.fetch_server(id).await;
        self.in_flight.remove(&key);
        Ok(self.add_server(fetched?))
    }

    #[instrument(skip(self))]
    pub async fn fetch_member(&self, server_id: Ulid, user_id: Ulid) -> StoreResult<SharedMember> {
        if let Ok(member) = self.get_member(server_id, user_id) {
            return Ok(member);
        }
        let key = FlightKey::Member(server_id, user_id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(member) = self.get_member(server_id, user_id) {
            return Ok(member);
        }
        let outcome = match self.transport.fetch_member(server_id, user_id).await {
            Ok(payload) => match self.fetch_user(user_id).await {
                Ok(_) => self.add_member(payload),
                Err(err) => Err(err),
            },
            Err(err) => Err(err.into()),
        };
        self.in_flight.remove(&key);
        outcome
    }

    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn fetch_message(&self, channel_id: Ulid, id: Ulid) -> StoreResult<SharedMessage> {
        if let Ok(message) = self.get_message(id) {
            return Ok(message);
        }
        let key = FlightKey::Message(id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(message) = self.get_message(id) {
            return Ok(message);
        }
        let outcome = match self.transport.fetch_message(channel_id, id).await {
            Ok(payload) => self.ingest_message(payload).await,
            Err(err) => Err(err.into()),
        };
        self.in_flight.remove(&key);
        outcome
    }

    /// Return the DM channel shared with a peer, opening one if necessary
    #[instrument(skip(self))]
    pub async fn fetch_dm_channel(&self, peer_id: Ulid) -> StoreResult<SharedChannel> {
        if let Ok(channel) = self.get_dm_channel(peer_id) {
            return Ok(channel);
        }
        let key = FlightKey::DirectMessage(peer_id);
        let gate = self.flight_gate(key);
        let _held = gate.lock().await;
        if let Ok(channel) = self.get_dm_channel(peer_id) {
            return Ok(channel);
        }
        let fetched = self.transport.open_dm(peer_id).await;
        self.in_flight.remove(&key);
        Ok(self.add_channel(fetched?))
    }

    /// Pull a user's lazily loaded profile section and cache it on the user
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn fetch_user_profile(&self, id: Ulid) -> StoreResult<SharedUser> {
        let user = self.fetch_user(id).await?;
        let payload = self.transport.fetch_user_profile(id).await?;
        user.write().set_profile(payload);
        Ok(user)
    }

    // =========================================================================
    // Message ingestion
    // =========================================================================

    /// Build a message from its wire payload, resolving the channel, the
    /// author, and any cached replies, then insert it.
    ///
    /// Author resolution prefers the server member; a member the server no
    /// longer lists falls back to the plain user. Replies are best effort,
    /// ids the cache no longer holds stay unresolved.
    #[instrument(skip(self, payload), fields(message_id = %payload.id, channel_id = %payload.channel))]
    pub async fn ingest_message(&self, payload: MessagePayload) -> StoreResult<SharedMessage> {
        if let Ok(existing) = self.get_message(payload.id) {
            return Ok(existing);
        }
        let channel = self.fetch_channel(payload.channel).await?;
        let author = self.resolve_author(&channel, payload.author).await?;
        let replies = self.resolve_replies(payload.replies.as_deref());
        Ok(self.insert_message(Message::from_parts(payload, channel, author, replies)))
    }

    async fn resolve_author(
        &self,
        channel: &SharedChannel,
        author_id: Ulid,
    ) -> StoreResult<MessageAuthor> {
        if author_id.is_zero() {
            return Ok(MessageAuthor::System);
        }
        let server_id = channel.read().server_id;
        match server_id {
            Some(server_id) => match self.fetch_member(server_id, author_id).await {
                Ok(member) => Ok(MessageAuthor::Member(member)),
                Err(err) if err.is_not_found() => {
                    Ok(MessageAuthor::User(self.fetch_user(author_id).await?))
                }
                Err(err) => Err(err),
            },
            None => Ok(MessageAuthor::User(self.fetch_user(author_id).await?)),
        }
    }

    fn resolve_replies(&self, reply_ids: Option<&[Ulid]>) -> Vec<SharedMessage> {
        reply_ids
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.get_message(*id).ok())
            .collect()
    }

    fn insert_message(&self, message: Message) -> SharedMessage {
        let id = message.id;
        let mut inserted = false;
        let handle = match self.messages.entry(id) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                inserted = true;
                slot.insert(shared(message)).value().clone()
            }
        };
        if inserted {
            let mut order = self.message_order.lock();
            order.push_back(id);
            if self.messages.len() > self.message_limit {
                if let Some(oldest) = order.pop_front() {
                    self.messages.remove(&oldest);
                    debug!(message_id = %oldest, "evicted oldest message");
                }
            }
        }
        handle
    }

    // =========================================================================
    // Partial updates
    // =========================================================================

    /// Apply an edit frame to a cached message, returning the pre-edit
    /// snapshot alongside the live handle. Uncached messages are skipped.
    pub fn update_message(
        &self,
        id: Ulid,
        data: &MessageEditDataPayload,
    ) -> Option<(Message, SharedMessage)> {
        let handle = self.get_message(id).ok()?;
        let old = {
            let mut message = handle.write();
            let old = message.clone();
            message.apply_edit(data);
            old
        };
        Some((old, handle))
    }

    pub fn update_channel(
        &self,
        id: Ulid,
        data: &ChannelDataPayload,
        clear: &[ChannelField],
    ) -> StoreResult<(Channel, SharedChannel)> {
        let handle = self.get_channel(id)?;
        let old = {
            let mut channel = handle.write();
            let old = channel.clone();
            channel.apply_update(data, clear);
            old
        };
        self.index_direct_message(id, &handle);
        Ok((old, handle))
    }

    pub fn update_server(
        &self,
        id: Ulid,
        data: &ServerDataPayload,
        clear: &[ServerField],
    ) -> StoreResult<(Server, SharedServer)> {
        let handle = self.get_server(id)?;
        let old = {
            let mut server = handle.write();
            let old = server.clone();
            server.apply_update(data, clear);
            old
        };
        Ok((old, handle))
    }

    pub fn update_member(
        &self,
        server_id: Ulid,
        user_id: Ulid,
        data: &MemberDataPayload,
        clear: &[MemberField],
    ) -> StoreResult<(Member, SharedMember)> {
        let handle = self.get_member(server_id, user_id)?;
        let old = {
            let mut member = handle.write();
            let old = member.clone();
            member.apply_update(data, clear);
            old
        };
        Ok((old, handle))
    }

    pub fn update_user(
        &self,
        id: Ulid,
        data: &UserDataPayload,
        clear: &[UserField],
    ) -> StoreResult<(User, SharedUser)> {
        let handle = self.get_user(id)?;
        let old = {
            let mut user = handle.write();
            let old = user.clone();
            user.apply_update(data, clear);
            old
        };
        Ok((old, handle))
    }

    /// Patch a role in place, materializing it if this frame is the first
    /// sight of it. Returns the pre-patch snapshot when one existed.
    pub fn update_role(
        &self,
        server_id: Ulid,
        role_id: Ulid,
        data: &RoleDataPayload,
        clear: &[RoleField],
    ) -> StoreResult<(Option<Role>, SharedServer)> {
        let handle = self.get_server(server_id)?;
        let old = {
            let mut server = handle.write();
            match server.role(role_id) {
                Some(role) => {
                    let old = role.clone();
                    server.patch_role(role_id, data, clear);
                    Some(old)
                }
                None => {
                    let role = Self::materialize_role(role_id, data).ok_or(
                        StoreError::NotFound {
                            kind: EntityKind::Role,
                            id: role_id,
                        },
                    )?;
                    server.upsert_role(role);
                    None
                }
            }
        };
        Ok((old, handle))
    }

    /// A role update for an unknown role carries the full definition; one
    /// without a name and permission set is undecodable and dropped.
    fn materialize_role(role_id: Ulid, data: &RoleDataPayload) -> Option<Role> {
        let name = data.name.clone()?;
        let permissions = data.permissions?;
        Some(Role {
            id: role_id,
            name,
            // unranked roles sort last
            rank: data.rank.unwrap_or(i64::MAX),
            colour: data.colour.clone(),
            hoist: data.hoist.unwrap_or(false),
            server_permissions: permissions.server(),
            channel_permissions: permissions.channel(),
        })
    }

    pub fn remove_role(&self, server_id: Ulid, role_id: Ulid) -> StoreResult<Option<Role>> {
        let handle = self.get_server(server_id)?;
        let removed = handle.write().remove_role(role_id);
        Ok(removed)
    }

    // =========================================================================
    // Removal
    // =========================================================================

    pub fn remove_message(&self, id: Ulid) -> Option<SharedMessage> {
        let removed = self.messages.remove(&id).map(|(_, message)| message);
        if removed.is_some() {
            self.message_order.lock().retain(|queued| *queued != id);
        }
        removed
    }

    pub fn remove_channel(&self, id: Ulid) -> Option<SharedChannel> {
        let removed = self.channels.remove(&id).map(|(_, channel)| channel);
        if removed.is_some() {
            self.dm_channels.retain(|_, channel_id| *channel_id != id);
        }
        removed
    }

    pub fn remove_member(&self, server_id: Ulid, user_id: Ulid) -> Option<SharedMember> {
        self.members
            .get(&server_id)
            .and_then(|bucket| bucket.remove(&user_id))
            .map(|(_, member)| member)
    }

    /// Drop a server with its member map and its channels
    pub fn remove_server(&self, id: Ulid) -> Option<SharedServer> {
        let removed = self.servers.remove(&id).map(|(_, server)| server)?;
        self.members.remove(&id);
        let channel_ids = removed.read().channel_ids.clone();
        for channel_id in channel_ids {
            self.remove_channel(channel_id);
        }
        Some(removed)
    }

    // =========================================================================
    // Server hydration
    // =========================================================================

    /// Insert a server and resolve every channel it references that the
    /// cache does not hold yet. Channels the API reports gone are skipped,
    /// any other failure propagates.
    #[instrument(skip(self, payload), fields(server_id = %payload.id))]
    pub async fn hydrate_server(&self, payload: ServerPayload) -> StoreResult<SharedServer> {
        let channel_ids = payload.channels.clone();
        let server = self.add_server(payload);
        self.adopt_channels(channel_ids).await?;
        Ok(server)
    }

    /// Fetch a server by id and hydrate its channel graph
    #[instrument(skip(self))]
    pub async fn hydrate_server_by_id(&self, id: Ulid) -> StoreResult<SharedServer> {
        let payload = self.transport.fetch_server(id).await?;
        self.hydrate_server(payload).await
    }

    pub(crate) async fn adopt_channels(&self, channel_ids: Vec<Ulid>) -> StoreResult<()> {
        let missing: Vec<Ulid> = channel_ids
            .into_iter()
            .filter(|id| !self.channels.contains_key(id))
            .collect();
        let results =
            futures::future::join_all(missing.into_iter().map(|id| self.adopt_channel(id))).await;
        for result in results {
            result?;
        }
        Ok(())
    }

    async fn adopt_channel(&self, id: Ulid) -> StoreResult<()> {
        match self.fetch_channel(id).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                debug!(channel_id = %id, "channel listed by server is gone, skipping");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn flight_gate(&self, key: FlightKey) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .entry(key)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .value()
            .clone()
    }

    /// Keep the peer-to-channel index current for DM-shaped channels
    fn index_direct_message(&self, channel_id: Ulid, channel: &SharedChannel) {
        let Some(self_id) = self.self_id() else {
            return;
        };
        let guard = channel.read();
        match guard.kind {
            ChannelKind::DirectMessage => {
                if let Some(peer) = guard.dm_peer(self_id) {
                    self.dm_channels.insert(peer, channel_id);
                }
            }
            ChannelKind::SavedMessages => {
                self.dm_channels.insert(self_id, channel_id);
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("message_limit", &self.message_limit)
            .field("users", &self.users.len())
            .field("channels", &self.channels.len())
            .field("servers", &self.servers.len())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}
