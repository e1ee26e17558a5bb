//! Gateway connection - socket lifecycle and the session state machine
//!
//! One `Gateway` drives one socket session: resolve the URL, authenticate,
//! load the Ready snapshot into the store, then pump frames into the ordered
//! routing lanes until the server closes the socket or [`Gateway::stop`] is
//! called. Every frame is decoded exactly once here; handlers downstream see
//! typed events only.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use ampere_cache::Store;
use ampere_core::{ClientEvent, ServerEvent, Transport, Ulid};

use crate::dispatch::EventDispatcher;
use crate::error::{GatewayError, GatewayResult};
use crate::events::Event;
use crate::handlers::{HandlerContext, InboundFrame};
use crate::router::FrameRouter;

/// Frames the caller may queue before `send` backpressures
const OUTBOUND_BUFFER_SIZE: usize = 100;

/// Where the session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// No socket; the initial and terminal state
    Disconnected,
    /// Resolving the socket URL and opening the connection
    Connecting,
    /// Socket open, Authenticate sent, waiting for the server's verdict
    Authenticating,
    /// Ready received, loading the snapshot into the store
    Bootstrapping,
    /// Snapshot loaded; frames are flowing to listeners
    Live,
}

impl fmt::Display for GatewayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Bootstrapping => "bootstrapping",
            Self::Live => "live",
        };
        write!(f, "{name}")
    }
}

/// Tunables for a gateway session
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Socket URL override; resolved from the API node when unset
    pub url: Option<String>,
    /// Interval between protocol-level pings
    pub heartbeat: Duration,
    /// Number of ordered routing lanes
    pub lanes: usize,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            url: None,
            heartbeat: Duration::from_secs(15),
            lanes: 8,
        }
    }
}

/// A single gateway session over one WebSocket
pub struct Gateway {
    token: String,
    options: GatewayOptions,
    transport: Arc<dyn Transport>,
    store: Arc<Store>,
    dispatcher: Arc<EventDispatcher>,
    state: watch::Sender<GatewayState>,
    shutdown: watch::Sender<bool>,
    outbound: parking_lot::RwLock<Option<mpsc::Sender<ClientEvent>>>,
    running: AtomicBool,
}

impl Gateway {
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        transport: Arc<dyn Transport>,
        store: Arc<Store>,
        dispatcher: Arc<EventDispatcher>,
        options: GatewayOptions,
    ) -> Self {
        Self {
            token: token.into(),
            options,
            transport,
            store,
            dispatcher,
            state: watch::Sender::new(GatewayState::Disconnected),
            shutdown: watch::Sender::new(false),
            outbound: parking_lot::RwLock::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Drive the session until the server closes the socket or [`stop`]
    /// is called. Returns `Ok(())` only for a requested shutdown.
    ///
    /// [`stop`]: Gateway::stop
    pub async fn run(&self) -> GatewayResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GatewayError::AlreadyRunning);
        }
        self.shutdown.send_replace(false);
        let outcome = self.drive().await;
        *self.outbound.write() = None;
        self.state.send_replace(GatewayState::Disconnected);
        self.running.store(false, Ordering::SeqCst);
        match &outcome {
            Ok(()) => tracing::info!("gateway stopped"),
            Err(err) => {
                tracing::error!(code = err.code(), error = %err, "gateway stopped with an error");
            }
        }
        outcome
    }

    async fn drive(&self) -> GatewayResult<()> {
        self.state.send_replace(GatewayState::Connecting);
        let url = self.resolve_url().await?;
        tracing::debug!(%url, "opening gateway socket");
        let (socket, _) = connect_async(&url).await?;
        let (mut sink, mut stream) = socket.split();

        self.state.send_replace(GatewayState::Authenticating);
        let auth = serde_json::to_string(&ClientEvent::Authenticate {
            token: self.token.clone(),
        })?;
        sink.send(Message::Text(auth)).await?;
        tracing::info!("authenticate frame sent");

        let (outbound_tx, mut outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        *self.outbound.write() = Some(outbound_tx);

        let ctx = Arc::new(HandlerContext::new(
            self.store.clone(),
            self.dispatcher.clone(),
        ));
        let router = FrameRouter::spawn(ctx, self.options.lanes, self.shutdown.subscribe());

        let mut heartbeat = tokio::time::interval(self.options.heartbeat);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it.
        heartbeat.tick().await;

        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("shutdown requested, closing socket");
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                }
                _ = heartbeat.tick() => {
                    let ping = serde_json::to_string(&ClientEvent::Ping { data: 0 })?;
                    sink.send(Message::Text(ping)).await?;
                    tracing::trace!("heartbeat sent");
                }
                Some(frame) = outbound_rx.recv() => {
                    let text = serde_json::to_string(&frame)?;
                    sink.send(Message::Text(text)).await?;
                }
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => self.handle_frame(&router, &text).await?,
                    Some(Ok(Message::Ping(_))) => tracing::trace!("socket ping"),
                    Some(Ok(Message::Pong(_))) => tracing::trace!("socket pong"),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::warn!(?frame, "server closed the socket");
                        return Err(GatewayError::Closed);
                    }
                    Some(Ok(other)) => tracing::debug!(len = other.len(), "ignoring non-text frame"),
                    Some(Err(err)) => return Err(err.into()),
                    None => return Err(GatewayError::Closed),
                },
            }
        }
    }

    async fn resolve_url(&self) -> GatewayResult<String> {
        if let Some(url) = &self.options.url {
            return Ok(url.clone());
        }
        let info = self.transport.get_api_info().await?;
        Ok(info.ws)
    }

    async fn handle_frame(&self, router: &FrameRouter, text: &str) -> GatewayResult<()> {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "malformed frame skipped");
                return Ok(());
            }
        };
        let tag = match value.get("type").and_then(|t| t.as_str()) {
            Some(tag) => tag.to_string(),
            None => {
                tracing::warn!("frame without a type tag skipped");
                return Ok(());
            }
        };
        if *self.state.borrow() == GatewayState::Live {
            self.route_live(router, &tag, value).await
        } else {
            self.handle_pre_live(&tag, value).await
        }
    }

    /// Frames before Ready drive the handshake; none reach listeners
    async fn handle_pre_live(&self, tag: &str, value: serde_json::Value) -> GatewayResult<()> {
        match tag {
            "Authenticated" => {
                tracing::info!("session authenticated");
                Ok(())
            }
            "Ready" => self.bootstrap(value).await,
            "Error" => {
                let detail = value
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                Err(GatewayError::Rejected(detail))
            }
            _ => {
                tracing::trace!(tag, "dropping frame before live");
                Ok(())
            }
        }
    }

    /// Load the Ready snapshot into the store, then go live
    async fn bootstrap(&self, value: serde_json::Value) -> GatewayResult<()> {
        self.state.send_replace(GatewayState::Bootstrapping);
        match serde_json::from_value(value)? {
            ServerEvent::Ready {
                users,
                servers,
                channels,
                members,
            } => {
                self.store
                    .populate_snapshot(users, servers, channels, members)
                    .await?;
                self.state.send_replace(GatewayState::Live);
                tracing::info!("session live");
                // Listeners run off the socket task; a slow one cannot
                // stall the read loop.
                let dispatcher = self.dispatcher.clone();
                tokio::spawn(async move { dispatcher.dispatch(Event::Ready).await });
            }
            other => tracing::warn!(tag = other.tag(), "expected a ready frame"),
        }
        Ok(())
    }

    /// Decode the frame once and hand it to the ordered lanes
    async fn route_live(
        &self,
        router: &FrameRouter,
        tag: &str,
        value: serde_json::Value,
    ) -> GatewayResult<()> {
        let raw = self
            .dispatcher
            .has_raw(tag)
            .then(|| (tag.to_string(), value.clone()));
        let event: ServerEvent = match serde_json::from_value(value) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(tag, error = %err, "unrecognized frame skipped");
                if let Some((tag, value)) = raw {
                    self.dispatcher.dispatch_raw(&tag, value).await;
                }
                return Ok(());
            }
        };
        match event {
            ServerEvent::Authenticated | ServerEvent::Ready { .. } => {
                tracing::trace!(tag, "duplicate handshake frame dropped");
            }
            event => router.deliver(InboundFrame { raw, event }).await,
        }
        Ok(())
    }

    /// Ask the running session to close; [`run`](Gateway::run) returns
    /// once the socket is down. Safe to call from any task.
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    #[must_use]
    pub fn state(&self) -> GatewayState {
        *self.state.borrow()
    }

    /// Watch state transitions as they happen
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<GatewayState> {
        self.state.subscribe()
    }

    /// Queue a frame for the socket
    pub async fn send(&self, event: ClientEvent) -> GatewayResult<()> {
        let sender = self.outbound.read().clone();
        match sender {
            Some(sender) => sender
                .send(event)
                .await
                .map_err(|_| GatewayError::NotConnected),
            None => Err(GatewayError::NotConnected),
        }
    }

    /// Show the account as typing in a channel
    pub async fn begin_typing(&self, channel: Ulid) -> GatewayResult<()> {
        self.send(ClientEvent::BeginTyping { channel }).await
    }

    /// Clear the account's typing indicator in a channel
    pub async fn end_typing(&self, channel: Ulid) -> GatewayResult<()> {
        self.send(ClientEvent::EndTyping { channel }).await
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
