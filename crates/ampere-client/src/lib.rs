//! # ampere-client
//!
//! Application-facing runtime. A builder, an explicit start/stop lifecycle,
//! listener registration, cached entity lookups, and messaging helpers, all
//! over one shared entity store kept current by the gateway.

mod builder;
mod client;
mod error;

pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ClientError, ClientResult};

// Re-export the types callers touch through the client surface
pub use ampere_core::{
    Channel, ChannelKind, Member, Message, MessageAuthor, MessageQuery, MessageSort, Role, Server,
    SharedChannel, SharedMember, SharedMessage, SharedServer, SharedUser, Ulid, User,
};
pub use ampere_gateway::{Event, GatewayState};
