//! Message frames - create, edit, delete

use ampere_core::{MessageEditDataPayload, MessagePayload, Ulid};

use super::HandlerContext;
use crate::error::GatewayResult;
use crate::events::Event;

pub(crate) struct MessageHandler;

impl MessageHandler {
    /// Cache the new message and raise "message" unless it is a system notice
    pub async fn created(ctx: &HandlerContext, payload: MessagePayload) -> GatewayResult<()> {
        let system = payload.author.is_zero();
        let message = ctx.store().ingest_message(payload).await?;
        if system {
            tracing::trace!(message_id = %message.read().id, "system message cached without dispatch");
            return Ok(());
        }
        ctx.dispatcher().dispatch(Event::Message(message)).await;
        Ok(())
    }

    /// Apply an edit. Edits to messages that already fell out of the
    /// bounded cache are dropped, the raw listener is their only way out.
    pub async fn updated(
        ctx: &HandlerContext,
        id: Ulid,
        data: MessageEditDataPayload,
    ) -> GatewayResult<()> {
        match ctx.store().update_message(id, &data) {
            Some((old, message)) => {
                ctx.dispatcher()
                    .dispatch(Event::MessageUpdate { old, message })
                    .await;
            }
            None => tracing::trace!(message_id = %id, "edit for uncached message dropped"),
        }
        Ok(())
    }

    /// Unlink the message and hand the orphaned instance to listeners
    pub async fn deleted(ctx: &HandlerContext, id: Ulid) -> GatewayResult<()> {
        match ctx.store().remove_message(id) {
            Some(message) => {
                ctx.dispatcher()
                    .dispatch(Event::MessageDelete { message })
                    .await;
            }
            None => tracing::trace!(message_id = %id, "delete for uncached message dropped"),
        }
        Ok(())
    }
}
