//! Attachment entity - represents a file stored on the CDN

use crate::protocol::payloads::{FileKind, FilePayload};

/// File attached to a message, avatar, icon or banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: String,
    pub tag: String,
    pub filename: String,
    pub size: u64,
    pub kind: FileKind,
    pub content_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Attachment {
    /// Resolve an attachment from its wire payload
    pub fn from_payload(payload: FilePayload) -> Self {
        Self {
            id: payload.id,
            tag: payload.tag,
            filename: payload.filename,
            size: payload.size,
            kind: payload.metadata.kind,
            content_type: payload.content_type,
            width: payload.metadata.width,
            height: payload.metadata.height,
        }
    }

    /// Build the download URL against a CDN base
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}/{}", base.trim_end_matches('/'), self.tag, self.id)
    }

    /// Check if attachment is an image
    #[inline]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, FileKind::Image)
    }

    /// Check if attachment is a video
    #[inline]
    pub fn is_video(&self) -> bool {
        matches!(self.kind, FileKind::Video)
    }

    /// Check if attachment has dimensions (is an image/video)
    pub fn has_dimensions(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}
