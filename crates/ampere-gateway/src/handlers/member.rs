//! Member frames - join, leave, update
//!
//! A join or leave frame naming the account itself means the client entered
//! or lost a whole server, not that a roster entry changed. Those frames
//! resize the cached server graph and raise server-level events.

use ampere_core::{MemberDataPayload, MemberField, MemberIdPayload, MemberPayload, Ulid};

use super::HandlerContext;
use crate::error::GatewayResult;
use crate::events::Event;

pub(crate) struct MemberHandler;

impl MemberHandler {
    /// Self joining pulls the whole server with its roster and raises
    /// "server_added"; anyone else becomes a cached member, "member_join".
    pub async fn joined(ctx: &HandlerContext, server_id: Ulid, user_id: Ulid) -> GatewayResult<()> {
        if ctx.store().is_self(user_id) {
            let server = ctx.store().hydrate_server_by_id(server_id).await?;
            ctx.store().populate_server(server_id).await?;
            ctx.dispatcher().dispatch(Event::ServerAdded(server)).await;
            return Ok(());
        }
        ctx.store().fetch_server(server_id).await?;
        ctx.store().fetch_user(user_id).await?;
        // The frame carries no roster detail; the member starts bare.
        let member = ctx.store().add_member(MemberPayload {
            id: MemberIdPayload {
                server: server_id,
                user: user_id,
            },
            nickname: None,
            avatar: None,
            roles: None,
        })?;
        ctx.dispatcher().dispatch(Event::MemberJoin(member)).await;
        Ok(())
    }

    /// Self leaving evicts the server graph, "server_removed"; anyone else
    /// drops a single roster entry, "member_leave".
    pub async fn left(ctx: &HandlerContext, server_id: Ulid, user_id: Ulid) -> GatewayResult<()> {
        if ctx.store().is_self(user_id) {
            match ctx.store().remove_server(server_id) {
                Some(server) => {
                    ctx.dispatcher()
                        .dispatch(Event::ServerRemoved { server })
                        .await;
                }
                None => tracing::trace!(%server_id, "left a server that was never cached"),
            }
            return Ok(());
        }
        match ctx.store().remove_member(server_id, user_id) {
            Some(member) => {
                ctx.dispatcher().dispatch(Event::MemberLeave { member }).await;
            }
            None => {
                tracing::trace!(%server_id, %user_id, "leave for uncached member dropped");
            }
        }
        Ok(())
    }

    /// Patch the cached member and raise "member_update" with both versions
    pub async fn updated(
        ctx: &HandlerContext,
        id: MemberIdPayload,
        data: MemberDataPayload,
        clear: Vec<MemberField>,
    ) -> GatewayResult<()> {
        let (old, member) = ctx.store().update_member(id.server, id.user, &data, &clear)?;
        ctx.dispatcher()
            .dispatch(Event::MemberUpdate { old, member })
            .await;
        Ok(())
    }
}
