//! Attachment lookup for media field previews.

use serde::{Deserialize, Serialize};

/// A resolved attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAttachment {
    pub url: String,
    pub mime_type: String,
}

impl MediaAttachment {
    pub fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }

    /// Last path segment of the URL, used as the display name.
    pub fn file_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }
}

/// Resolves attachment reference ids to their URL and mime type.
pub trait MediaResolver: Send + Sync {
    fn resolve(&self, attachment_id: u64) -> Option<MediaAttachment>;
}

/// Resolver that knows no attachments; media fields render without preview.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaResolver for NoMedia {
    fn resolve(&self, _attachment_id: u64) -> Option<MediaAttachment> {
        None
    }
}
