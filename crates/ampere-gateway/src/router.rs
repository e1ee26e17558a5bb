//! Ordered routing lanes
//!
//! Frames touching the same entity must apply in arrival order, while
//! unrelated frames may run concurrently. Each decoded frame is hashed by
//! its ordering key onto one of a fixed set of lanes; a lane is a task that
//! applies its frames serially. Two frames for the same channel therefore
//! never race, and a busy channel never stalls the rest of the stream.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use ampere_core::{ServerEvent, Ulid};

use crate::handlers::{FrameDispatcher, HandlerContext, InboundFrame};

/// Frames a single lane may hold before the socket loop backpressures
const LANE_BUFFER_SIZE: usize = 64;

/// Fans decoded frames out to per-entity ordered lanes
pub(crate) struct FrameRouter {
    lanes: Vec<mpsc::Sender<InboundFrame>>,
}

impl FrameRouter {
    /// Spawn the lane tasks and return the router feeding them
    pub fn spawn(
        ctx: Arc<HandlerContext>,
        lanes: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let count = lanes.max(1);
        let mut senders = Vec::with_capacity(count);
        for lane in 0..count {
            let (tx, mut rx) = mpsc::channel::<InboundFrame>(LANE_BUFFER_SIZE);
            let ctx = ctx.clone();
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        frame = rx.recv() => match frame {
                            Some(frame) => FrameDispatcher::process(&ctx, frame).await,
                            None => break,
                        },
                    }
                }
                tracing::trace!(lane, "routing lane stopped");
            });
            senders.push(tx);
        }
        Self { lanes: senders }
    }

    /// Queue a frame on the lane owning its entity
    pub async fn deliver(&self, frame: InboundFrame) {
        let lane = match Self::ordering_key(&frame.event) {
            Some(key) => {
                let mut hasher = DefaultHasher::new();
                key.hash(&mut hasher);
                (hasher.finish() as usize) % self.lanes.len()
            }
            None => 0,
        };
        if self.lanes[lane].send(frame).await.is_err() {
            tracing::warn!(lane, "routing lane is gone, frame dropped");
        }
    }

    /// The entity whose frames must stay mutually ordered. Message frames
    /// key on their channel so an edit can never apply before its create.
    fn ordering_key(event: &ServerEvent) -> Option<Ulid> {
        match event {
            ServerEvent::Message(payload) => Some(payload.channel),
            ServerEvent::MessageUpdate { channel, .. }
            | ServerEvent::MessageDelete { channel, .. } => Some(*channel),
            ServerEvent::ChannelCreate(payload) => Some(payload.id()),
            ServerEvent::ChannelUpdate { id, .. }
            | ServerEvent::ChannelDelete { id }
            | ServerEvent::ChannelStartTyping { id, .. }
            | ServerEvent::ChannelStopTyping { id, .. } => Some(*id),
            ServerEvent::ServerUpdate { id, .. }
            | ServerEvent::ServerDelete { id }
            | ServerEvent::ServerMemberJoin { id, .. }
            | ServerEvent::ServerMemberLeave { id, .. }
            | ServerEvent::ServerRoleUpdate { id, .. }
            | ServerEvent::ServerRoleDelete { id, .. } => Some(*id),
            ServerEvent::ServerMemberUpdate { id, .. } => Some(id.server),
            ServerEvent::UserUpdate { id, .. } => Some(*id),
            ServerEvent::UserRelationship { id, .. } => Some(*id),
            ServerEvent::Authenticated
            | ServerEvent::Pong { .. }
            | ServerEvent::Error { .. }
            | ServerEvent::Ready { .. } => None,
        }
    }
}
