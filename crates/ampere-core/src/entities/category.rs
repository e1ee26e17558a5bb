//! Category entity - a named grouping of server channels

use crate::protocol::payloads::CategoryPayload;
use crate::value_objects::Ulid;

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Ulid,
    pub title: String,
    pub channel_ids: Vec<Ulid>,
}

impl Category {
    /// Resolve a category from its wire payload
    pub fn from_payload(payload: CategoryPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            channel_ids: payload.channels,
        }
    }

    /// Check if the category contains a channel
    #[inline]
    pub fn contains_channel(&self, channel_id: Ulid) -> bool {
        self.channel_ids.contains(&channel_id)
    }
}
