use async_trait::async_trait;

use super::error::MediaError;
use super::key::{MediaKey, MediaKind};

/// A new media payload waiting to be pushed to the external host.
#[derive(Clone)]
pub struct PendingUpload {
    pub bytes: Vec<u8>,
    /// Client-supplied filename; only used to derive the storage key.
    pub filename: String,
    pub content_type: Option<String>,
    pub kind: MediaKind,
}

impl PendingUpload {
    /// Build an upload, inferring the resource kind from the content type
    /// (preferred) or the filename extension.
    pub fn new(bytes: Vec<u8>, filename: String, content_type: Option<String>) -> Self {
        let kind = match content_type.as_deref() {
            Some(ct) => MediaKind::from_content_type(ct),
            None => MediaKind::from_filename(&filename),
        };
        Self {
            bytes,
            filename,
            content_type,
            kind,
        }
    }

    /// Override the inferred resource kind (e.g. an explicit admin choice).
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Result of a successful upload to the media host.
///
/// Both the public URL and the opaque storage key are returned; callers
/// persist both so the object can be deleted later without URL parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedMedia {
    pub key: MediaKey,
    pub url: String,
    pub kind: MediaKind,
}

/// Client for an external media host.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a payload under the given folder and return its key and
    /// publicly resolvable URL.
    async fn upload(
        &self,
        upload: &PendingUpload,
        folder: &str,
    ) -> Result<UploadedMedia, MediaError>;

    /// Delete a previously uploaded object.
    ///
    /// Returns `true` if the object existed; deleting an unknown key is
    /// not an error.
    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError>;
}
