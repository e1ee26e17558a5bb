//! Client - owns the runtime context and the session lifecycle
//!
//! One `Client` holds the configuration, the REST transport, the entity
//! store, the event dispatcher, and the gateway. Nothing here is global;
//! dropping the client drops the whole runtime.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ampere_cache::Store;
use ampere_common::RuntimeConfig;
use ampere_core::{
    EditMessagePayload, MessageEditDataPayload, MessageQuery, SendMessagePayload, SharedChannel,
    SharedMember, SharedMessage, SharedServer, SharedUser, Transport, Ulid,
};
use ampere_gateway::{Event, EventDispatcher, Gateway, GatewayOptions, GatewayState};
use ampere_http::RestClient;

use crate::builder::ClientBuilder;
use crate::error::ClientResult;

/// The application-facing runtime
pub struct Client {
    config: RuntimeConfig,
    transport: Arc<RestClient>,
    store: Arc<Store>,
    dispatcher: Arc<EventDispatcher>,
    gateway: Arc<Gateway>,
}

impl Client {
    /// Builder entry point
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token)
    }

    /// Assemble the full context from a finished configuration
    pub fn from_config(config: RuntimeConfig) -> ClientResult<Self> {
        let transport = Arc::new(RestClient::new(
            &config.api_url,
            &config.token,
            &config.user_agent,
        )?);
        let shared: Arc<dyn Transport> = transport.clone();
        let store = Arc::new(Store::new(shared.clone(), config.message_limit));
        let dispatcher = Arc::new(EventDispatcher::new());
        let options = GatewayOptions {
            url: config.gateway_url.clone(),
            heartbeat: Duration::from_secs(config.heartbeat_secs),
            ..GatewayOptions::default()
        };
        let gateway = Arc::new(Gateway::new(
            config.token.clone(),
            shared,
            store.clone(),
            dispatcher.clone(),
            options,
        ));
        Ok(Self {
            config,
            transport,
            store,
            dispatcher,
            gateway,
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Identify against the API, then drive the gateway until the server
    /// closes the socket or [`stop`](Client::stop) is called.
    pub async fn start(&self) -> ClientResult<()> {
        let info = self.transport.get_api_info().await?;
        if info.features.autumn.enabled {
            self.transport
                .set_file_server_url(info.features.autumn.url.clone());
        }
        tracing::info!(node = %info.revolt, "connected to API node");

        let me = self.transport.fetch_self().await?;
        let self_id = me.id;
        self.store.set_self_id(self_id);
        self.store.add_user(me);
        tracing::info!(user_id = %self_id, "identified account");

        self.gateway.run().await?;
        Ok(())
    }

    /// Ask the running session to close; [`start`](Client::start) returns
    /// once the socket is down.
    pub fn stop(&self) {
        self.gateway.stop();
    }

    #[must_use]
    pub fn state(&self) -> GatewayState {
        self.gateway.state()
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register the listener for an event, replacing any previous one
    pub fn on<F, Fut>(&self, event: &str, listener: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.on(event, listener);
    }

    /// Drop the listener for an event
    pub fn off(&self, event: &str) -> bool {
        self.dispatcher.off(event)
    }

    /// Register the error handler for one event's listener
    pub fn on_error<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(Event, anyhow::Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.dispatcher.on_error(event, handler);
    }

    /// Register a listener for the undecoded frame behind a wire tag
    pub fn on_raw<F, Fut>(&self, tag: &str, listener: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.on_raw(tag, listener);
    }

    /// Block until an event matching the predicate fires, or time out
    pub async fn wait_for<P>(
        &self,
        event: &str,
        timeout: Duration,
        predicate: P,
    ) -> ClientResult<Event>
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Ok(self.dispatcher.wait_for(event, timeout, predicate).await?)
    }

    // =========================================================================
    // Cached lookups
    // =========================================================================

    pub fn user(&self, id: Ulid) -> ClientResult<SharedUser> {
        Ok(self.store.get_user(id)?)
    }

    pub fn channel(&self, id: Ulid) -> ClientResult<SharedChannel> {
        Ok(self.store.get_channel(id)?)
    }

    pub fn server(&self, id: Ulid) -> ClientResult<SharedServer> {
        Ok(self.store.get_server(id)?)
    }

    pub fn member(&self, server_id: Ulid, user_id: Ulid) -> ClientResult<SharedMember> {
        Ok(self.store.get_member(server_id, user_id)?)
    }

    pub fn message(&self, id: Ulid) -> ClientResult<SharedMessage> {
        Ok(self.store.get_message(id)?)
    }

    /// The cached DM channel with a user, if one is indexed
    pub fn dm_channel(&self, peer_id: Ulid) -> ClientResult<SharedChannel> {
        Ok(self.store.get_dm_channel(peer_id)?)
    }

    /// The account's own cached user, once identified
    #[must_use]
    pub fn self_user(&self) -> Option<SharedUser> {
        let id = self.store.self_id()?;
        self.store.get_user(id).ok()
    }

    /// Direct handle to the entity store
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // =========================================================================
    // Messaging
    // =========================================================================

    /// Send a message and cache the echo
    pub async fn send_message(
        &self,
        channel_id: Ulid,
        body: SendMessagePayload,
    ) -> ClientResult<SharedMessage> {
        let payload = self.transport.send_message(channel_id, &body).await?;
        Ok(self.store.ingest_message(payload).await?)
    }

    /// Content-only convenience over [`send_message`](Client::send_message)
    pub async fn send_text(
        &self,
        channel_id: Ulid,
        content: impl Into<String>,
    ) -> ClientResult<SharedMessage> {
        self.send_message(
            channel_id,
            SendMessagePayload {
                content: content.into(),
                ..SendMessagePayload::default()
            },
        )
        .await
    }

    /// Edit a message in place and patch the cached copy
    pub async fn edit_message(
        &self,
        channel_id: Ulid,
        message_id: Ulid,
        body: EditMessagePayload,
    ) -> ClientResult<()> {
        self.transport
            .edit_message(channel_id, message_id, &body)
            .await?;
        let data = MessageEditDataPayload {
            content: Some(body.content),
            edited: None,
        };
        if self.store.update_message(message_id, &data).is_none() {
            tracing::debug!(message_id = %message_id, "edited message is not cached");
        }
        Ok(())
    }

    /// Delete a message and drop the cached copy
    pub async fn delete_message(&self, channel_id: Ulid, message_id: Ulid) -> ClientResult<()> {
        self.transport.delete_message(channel_id, message_id).await?;
        self.store.remove_message(message_id);
        Ok(())
    }

    /// Fetch message history, cache it, and hand back the non-system entries
    pub async fn history(
        &self,
        channel_id: Ulid,
        query: MessageQuery,
    ) -> ClientResult<Vec<SharedMessage>> {
        let payloads = self.transport.fetch_messages(channel_id, query).await?;
        let mut messages = Vec::with_capacity(payloads.len());
        for payload in payloads {
            if payload.author.is_zero() {
                continue;
            }
            messages.push(self.store.ingest_message(payload).await?);
        }
        Ok(messages)
    }

    /// Open (or return the cached) DM channel with a user
    pub async fn open_dm(&self, peer_id: Ulid) -> ClientResult<SharedChannel> {
        Ok(self.store.fetch_dm_channel(peer_id).await?)
    }

    /// Pull a user's profile section and cache it on the user
    pub async fn fetch_profile(&self, user_id: Ulid) -> ClientResult<SharedUser> {
        Ok(self.store.fetch_user_profile(user_id).await?)
    }

    /// Upload a file, returning the attachment id to reference in a send
    pub async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        tag: &str,
    ) -> ClientResult<String> {
        let uploaded = self.transport.upload_file(filename, bytes, tag).await?;
        Ok(uploaded.id)
    }

    // =========================================================================
    // Typing
    // =========================================================================

    /// Show the account as typing in a channel
    pub async fn begin_typing(&self, channel_id: Ulid) -> ClientResult<()> {
        Ok(self.gateway.begin_typing(channel_id).await?)
    }

    /// Clear the account's typing indicator in a channel
    pub async fn end_typing(&self, channel_id: Ulid) -> ClientResult<()> {
        Ok(self.gateway.end_typing(channel_id).await?)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("api_url", &self.config.api_url)
            .field("message_limit", &self.config.message_limit)
            .finish_non_exhaustive()
    }
}
