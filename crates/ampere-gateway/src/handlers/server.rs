//! Server frames - update, delete, role changes

use ampere_core::{RoleDataPayload, RoleField, ServerDataPayload, ServerField, Ulid};

use super::HandlerContext;
use crate::error::GatewayResult;
use crate::events::Event;

pub(crate) struct ServerHandler;

impl ServerHandler {
    /// Patch the cached server and raise "server_update" with both versions
    pub async fn updated(
        ctx: &HandlerContext,
        id: Ulid,
        data: ServerDataPayload,
        clear: Vec<ServerField>,
    ) -> GatewayResult<()> {
        let (old, server) = ctx.store().update_server(id, &data, &clear)?;
        ctx.dispatcher()
            .dispatch(Event::ServerUpdate { old, server })
            .await;
        Ok(())
    }

    /// Evict the server graph and raise "server_removed"
    pub async fn deleted(ctx: &HandlerContext, id: Ulid) -> GatewayResult<()> {
        match ctx.store().remove_server(id) {
            Some(server) => {
                ctx.dispatcher()
                    .dispatch(Event::ServerRemoved { server })
                    .await;
            }
            None => tracing::trace!(server_id = %id, "delete for uncached server dropped"),
        }
        Ok(())
    }

    /// Patch or materialize a role and raise "role_update"
    pub async fn role_updated(
        ctx: &HandlerContext,
        id: Ulid,
        role_id: Ulid,
        data: RoleDataPayload,
        clear: Vec<RoleField>,
    ) -> GatewayResult<()> {
        let (old, server) = ctx.store().update_role(id, role_id, &data, &clear)?;
        ctx.dispatcher()
            .dispatch(Event::RoleUpdate {
                server,
                role_id,
                old,
            })
            .await;
        Ok(())
    }

    /// Drop a role and hand its last definition to "role_delete" listeners
    pub async fn role_deleted(
        ctx: &HandlerContext,
        id: Ulid,
        role_id: Ulid,
    ) -> GatewayResult<()> {
        match ctx.store().remove_role(id, role_id)? {
            Some(role) => {
                let server = ctx.store().get_server(id)?;
                ctx.dispatcher()
                    .dispatch(Event::RoleDelete { server, role })
                    .await;
            }
            None => tracing::trace!(server_id = %id, %role_id, "delete for unknown role dropped"),
        }
        Ok(())
    }
}
