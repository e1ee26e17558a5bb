//! User frames - profile updates, relationship changes

use ampere_core::{Relationship, RelationshipKind, Ulid, UserDataPayload, UserField, UserPayload};

use super::HandlerContext;
use crate::error::GatewayResult;
use crate::events::Event;

pub(crate) struct UserHandler;

impl UserHandler {
    /// Patch the cached user and raise "user_update" with both versions
    pub async fn updated(
        ctx: &HandlerContext,
        id: Ulid,
        data: UserDataPayload,
        clear: Vec<UserField>,
    ) -> GatewayResult<()> {
        let (old, user) = ctx.store().update_user(id, &data, &clear)?;
        ctx.dispatcher()
            .dispatch(Event::UserUpdate { old, user })
            .await;
        Ok(())
    }

    /// Cache the counterpart, rewrite the account's relationship entry for
    /// them, raise "user_relationship"
    pub async fn relationship(
        ctx: &HandlerContext,
        payload: UserPayload,
        status: RelationshipKind,
    ) -> GatewayResult<()> {
        let user = ctx.store().add_user(payload);
        let target_id = user.read().id;
        if let Some(self_id) = ctx.store().self_id() {
            if let Ok(me) = ctx.store().get_user(self_id) {
                let mut me = me.write();
                me.relationships.retain(|r| r.user_id != target_id);
                if status != RelationshipKind::None {
                    me.relationships.push(Relationship {
                        kind: status,
                        user_id: target_id,
                    });
                }
            }
        }
        ctx.dispatcher()
            .dispatch(Event::UserRelationship { user, status })
            .await;
        Ok(())
    }
}
