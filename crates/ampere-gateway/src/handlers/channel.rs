//! Channel frames - create, update, delete, typing

use ampere_core::{
    ChannelDataPayload, ChannelField, ChannelPayload, SharedChannel, SharedUser, Ulid,
};

use super::HandlerContext;
use crate::error::GatewayResult;
use crate::events::Event;

pub(crate) struct ChannelHandler;

impl ChannelHandler {
    /// Cache the new channel, link it onto its server, raise "channel_create"
    pub async fn created(ctx: &HandlerContext, payload: ChannelPayload) -> GatewayResult<()> {
        let channel = ctx.store().add_channel(payload);
        let (channel_id, server_id) = {
            let guard = channel.read();
            (guard.id, guard.server_id)
        };
        if let Some(server_id) = server_id {
            match ctx.store().get_server(server_id) {
                Ok(server) => {
                    let mut server = server.write();
                    if !server.channel_ids.contains(&channel_id) {
                        server.channel_ids.push(channel_id);
                    }
                }
                Err(_) => {
                    tracing::debug!(%channel_id, %server_id, "channel created under uncached server");
                }
            }
        }
        ctx.dispatcher().dispatch(Event::ChannelCreate(channel)).await;
        Ok(())
    }

    /// Patch the cached channel and raise "channel_update" with both versions
    pub async fn updated(
        ctx: &HandlerContext,
        id: Ulid,
        data: ChannelDataPayload,
        clear: Vec<ChannelField>,
    ) -> GatewayResult<()> {
        let (old, channel) = ctx.store().update_channel(id, &data, &clear)?;
        ctx.dispatcher()
            .dispatch(Event::ChannelUpdate { old, channel })
            .await;
        Ok(())
    }

    /// Evict the channel, unlink it from its server, raise "channel_delete"
    pub async fn deleted(ctx: &HandlerContext, id: Ulid) -> GatewayResult<()> {
        match ctx.store().remove_channel(id) {
            Some(channel) => {
                let server_id = channel.read().server_id;
                if let Some(server_id) = server_id {
                    if let Ok(server) = ctx.store().get_server(server_id) {
                        server.write().channel_ids.retain(|c| *c != id);
                    }
                }
                ctx.dispatcher()
                    .dispatch(Event::ChannelDelete { channel })
                    .await;
            }
            None => tracing::trace!(channel_id = %id, "delete for uncached channel dropped"),
        }
        Ok(())
    }

    pub async fn typing_started(
        ctx: &HandlerContext,
        channel_id: Ulid,
        user_id: Ulid,
    ) -> GatewayResult<()> {
        let (channel, user) = Self::resolve(ctx, channel_id, user_id).await?;
        ctx.dispatcher()
            .dispatch(Event::TypingStart { channel, user })
            .await;
        Ok(())
    }

    pub async fn typing_stopped(
        ctx: &HandlerContext,
        channel_id: Ulid,
        user_id: Ulid,
    ) -> GatewayResult<()> {
        let (channel, user) = Self::resolve(ctx, channel_id, user_id).await?;
        ctx.dispatcher()
            .dispatch(Event::TypingStop { channel, user })
            .await;
        Ok(())
    }

    async fn resolve(
        ctx: &HandlerContext,
        channel_id: Ulid,
        user_id: Ulid,
    ) -> GatewayResult<(SharedChannel, SharedUser)> {
        let channel = ctx.store().fetch_channel(channel_id).await?;
        let user = ctx.store().fetch_user(user_id).await?;
        Ok((channel, user))
    }
}
