use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::MediaError;
use super::key::{MediaKey, MediaKind};
use super::traits::{MediaStore, PendingUpload, UploadedMedia};

struct StoredObject {
    bytes: Vec<u8>,
    content_type: Option<String>,
    kind: MediaKind,
}

/// In-memory media host for local development and tests.
///
/// Objects live in a process-local map; URLs are `{base_url}/{key}` and
/// resolve nowhere. Everything else behaves like the real host: uploads
/// mint fresh keys, deletes report whether the object existed.
pub struct MemoryMediaStore {
    base_url: String,
    objects: Mutex<HashMap<MediaKey, StoredObject>>,
}

impl MemoryMediaStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn url_for(&self, key: &MediaKey) -> String {
        format!("{}/{key}", self.base_url)
    }

    pub fn contains(&self, key: &MediaKey) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new("memory://media")
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(
        &self,
        upload: &PendingUpload,
        folder: &str,
    ) -> Result<UploadedMedia, MediaError> {
        let key = MediaKey::generate(folder, &upload.filename);
        let url = self.url_for(&key);

        self.objects.lock().unwrap().insert(
            key.clone(),
            StoredObject {
                bytes: upload.bytes.clone(),
                content_type: upload.content_type.clone(),
                kind: upload.kind,
            },
        );

        Ok(UploadedMedia {
            key,
            url,
            kind: upload.kind,
        })
    }

    async fn delete(&self, key: &MediaKey) -> Result<bool, MediaError> {
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }
}
