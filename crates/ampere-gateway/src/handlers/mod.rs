//! Inbound frame handlers
//!
//! Applies each decoded frame to the entity store and raises the matching
//! application event.

mod channel;
mod member;
mod message;
mod server;
mod user;

use std::sync::Arc;

use ampere_cache::Store;
use ampere_core::ServerEvent;

use crate::dispatch::EventDispatcher;
use crate::error::GatewayResult;

use channel::ChannelHandler;
use member::MemberHandler;
use message::MessageHandler;
use server::ServerHandler;
use user::UserHandler;

/// Shared context handed to every frame handler
pub struct HandlerContext {
    store: Arc<Store>,
    dispatcher: Arc<EventDispatcher>,
}

impl HandlerContext {
    #[must_use]
    pub fn new(store: Arc<Store>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }
}

/// A decoded frame on its way to a handler lane
pub(crate) struct InboundFrame {
    /// The undecoded frame, kept only when a raw listener wants it
    pub raw: Option<(String, serde_json::Value)>,
    pub event: ServerEvent,
}

/// Dispatch decoded frames to the matching domain handler
pub(crate) struct FrameDispatcher;

impl FrameDispatcher {
    /// Run the raw listener, then the typed handler. Handler failures are
    /// logged; they never stop the lane.
    pub async fn process(ctx: &HandlerContext, frame: InboundFrame) {
        if let Some((tag, payload)) = frame.raw {
            ctx.dispatcher().dispatch_raw(&tag, payload).await;
        }
        let tag = frame.event.tag();
        if let Err(err) = Self::dispatch(ctx, frame.event).await {
            tracing::warn!(tag, code = err.code(), error = %err, "frame handler failed");
        }
    }

    async fn dispatch(ctx: &HandlerContext, event: ServerEvent) -> GatewayResult<()> {
        match event {
            ServerEvent::Message(payload) => MessageHandler::created(ctx, payload).await,
            ServerEvent::MessageUpdate { id, data, .. } => {
                MessageHandler::updated(ctx, id, data).await
            }
            ServerEvent::MessageDelete { id, .. } => MessageHandler::deleted(ctx, id).await,

            ServerEvent::ChannelCreate(payload) => ChannelHandler::created(ctx, payload).await,
            ServerEvent::ChannelUpdate { id, data, clear } => {
                ChannelHandler::updated(ctx, id, data, clear).await
            }
            ServerEvent::ChannelDelete { id } => ChannelHandler::deleted(ctx, id).await,
            ServerEvent::ChannelStartTyping { id, user } => {
                ChannelHandler::typing_started(ctx, id, user).await
            }
            ServerEvent::ChannelStopTyping { id, user } => {
                ChannelHandler::typing_stopped(ctx, id, user).await
            }

            ServerEvent::ServerUpdate { id, data, clear } => {
                ServerHandler::updated(ctx, id, data, clear).await
            }
            ServerEvent::ServerDelete { id } => ServerHandler::deleted(ctx, id).await,
            ServerEvent::ServerRoleUpdate {
                id,
                role_id,
                data,
                clear,
            } => ServerHandler::role_updated(ctx, id, role_id, data, clear).await,
            ServerEvent::ServerRoleDelete { id, role_id } => {
                ServerHandler::role_deleted(ctx, id, role_id).await
            }

            ServerEvent::ServerMemberJoin { id, user } => {
                MemberHandler::joined(ctx, id, user).await
            }
            ServerEvent::ServerMemberLeave { id, user } => MemberHandler::left(ctx, id, user).await,
            ServerEvent::ServerMemberUpdate { id, data, clear } => {
                MemberHandler::updated(ctx, id, data, clear).await
            }

            ServerEvent::UserUpdate { id, data, clear } => {
                UserHandler::updated(ctx, id, data, clear).await
            }
            ServerEvent::UserRelationship { user, status, .. } => {
                UserHandler::relationship(ctx, user, status).await
            }

            ServerEvent::Pong { .. } => {
                tracing::trace!("pong frame");
                Ok(())
            }
            ServerEvent::Error { error } => {
                tracing::warn!(error, "gateway reported an error");
                Ok(())
            }
            // Consumed by the connection before routing.
            ServerEvent::Authenticated | ServerEvent::Ready { .. } => Ok(()),
        }
    }
}
