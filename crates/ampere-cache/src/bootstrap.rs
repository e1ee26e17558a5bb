//! Snapshot population - builds the initial object graph from the ready frame
//!
//! Inserts run in dependency order (users before members, servers before
//! their channels resolve) so every cross-reference lands on a live
//! instance. A second networked pass pulls the full member roster of every
//! server, since the snapshot only carries the members visible to the
//! gateway at connect time.

use std::time::Instant;

use tracing::{debug, info, instrument};

use ampere_core::{ChannelPayload, MemberPayload, ServerPayload, Ulid, UserPayload};

use crate::error::StoreResult;
use crate::store::Store;

impl Store {
    /// Populate the cache from the bootstrap snapshot, then pull every
    /// server's member roster.
    #[instrument(skip_all, fields(
        users = users.len(),
        servers = servers.len(),
        channels = channels.len(),
        members = members.len(),
    ))]
    pub async fn populate_snapshot(
        &self,
        users: Vec<UserPayload>,
        servers: Vec<ServerPayload>,
        channels: Vec<ChannelPayload>,
        members: Vec<MemberPayload>,
    ) -> StoreResult<()> {
        let started = Instant::now();

        for user in users {
            self.add_user(user);
        }
        let mut referenced: Vec<Ulid> = Vec::new();
        for server in servers {
            referenced.extend(server.channels.iter().copied());
            self.add_server(server);
        }
        for channel in channels {
            self.add_channel(channel);
        }
        for member in members {
            let server_id = member.id.server;
            let user_id = member.id.user;
            if let Err(err) = self.add_member(member) {
                debug!(%server_id, %user_id, error = %err, "skipping snapshot member");
            }
        }

        // Channels a server lists but the snapshot omitted.
        self.adopt_channels(referenced).await?;
        self.populate_all_servers().await?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            users = self.user_count(),
            servers = self.server_count(),
            channels = self.channel_count(),
            "cache populated"
        );
        Ok(())
    }

    /// Pull the member roster of every cached server
    pub async fn populate_all_servers(&self) -> StoreResult<()> {
        let server_ids: Vec<Ulid> = self
            .servers()
            .into_iter()
            .map(|server| server.read().id)
            .collect();
        let results = futures::future::join_all(
            server_ids.into_iter().map(|id| self.populate_server(id)),
        )
        .await;
        for result in results {
            result?;
        }
        Ok(())
    }

    /// Fetch one server's member list and cache the users backing it.
    /// Members whose user record no longer exists are skipped.
    #[instrument(skip(self))]
    pub async fn populate_server(&self, server_id: Ulid) -> StoreResult<()> {
        let roster = self.transport().fetch_members(server_id).await?;
        for user in roster.users {
            self.add_user(user);
        }
        for member in roster.members {
            let user_id = member.id.user;
            if let Err(err) = self.add_member(member) {
                debug!(%server_id, %user_id, error = %err, "skipping roster member");
            }
        }
        Ok(())
    }
}
