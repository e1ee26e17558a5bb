//! Domain entities - live chat objects resolved from wire payloads

use std::sync::Arc;

use parking_lot::RwLock;

mod attachment;
mod category;
mod channel;
mod member;
mod message;
mod role;
mod server;
mod user;

pub use attachment::Attachment;
pub use category::Category;
pub use channel::{Channel, ChannelKind};
pub use member::Member;
pub use message::{Masquerade, Message, MessageAuthor};
pub use role::Role;
pub use server::{Server, SystemMessageChannels};
pub use user::{Profile, Relationship, Status, User};

/// Handle to a cached entity, shared across the runtime
pub type Shared<T> = Arc<RwLock<T>>;

pub type SharedUser = Shared<User>;
pub type SharedChannel = Shared<Channel>;
pub type SharedServer = Shared<Server>;
pub type SharedMember = Shared<Member>;
pub type SharedMessage = Shared<Message>;

/// Wrap a freshly resolved entity for insertion into the cache
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}
