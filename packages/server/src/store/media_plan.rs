use std::sync::Arc;

use common::media::{MediaError, MediaKey, MediaStore, PendingUpload, UploadedMedia};

/// Desired state for a single media slot within a write.
#[derive(Default)]
pub enum MediaSlot {
    /// Retain whatever the persisted slot holds.
    #[default]
    Keep,
    /// Empty the slot; the old object is deleted after commit.
    Clear,
    /// Replace the slot with a new upload; the old object is deleted
    /// after commit.
    Upload(PendingUpload),
}

impl MediaSlot {
    /// Whether an existing key in this slot becomes garbage once the
    /// write commits.
    pub fn supersedes_existing(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Clear)
    }
}

/// Bookkeeping for one write attempt's media side effects.
///
/// Two lists, two fates: `uploaded` holds this attempt's fresh objects and
/// is deleted when the write fails; `doomed` holds the keys the committed
/// state no longer references and is deleted only after the transaction
/// commits. Cleanup failures on either path are logged and skipped; the
/// database row is the source of truth once written.
pub struct MediaPlan {
    media: Arc<dyn MediaStore>,
    folder: String,
    uploaded: Vec<UploadedMedia>,
    doomed: Vec<MediaKey>,
}

impl MediaPlan {
    pub fn new(media: Arc<dyn MediaStore>, folder: impl Into<String>) -> Self {
        Self {
            media,
            folder: folder.into(),
            uploaded: Vec::new(),
            doomed: Vec::new(),
        }
    }

    /// Queue a persisted key for deletion-after-commit.
    ///
    /// Keys come out of our own columns, so a parse failure means a
    /// corrupted row; it is logged and the key skipped rather than
    /// failing the write.
    pub fn condemn(&mut self, key: Option<&str>) {
        let Some(raw) = key else { return };
        match MediaKey::parse(raw) {
            Ok(key) => self.doomed.push(key),
            Err(e) => tracing::warn!("Skipping unparseable stored media key {raw:?}: {e}"),
        }
    }

    /// Number of keys queued for deletion-after-commit.
    pub fn doomed_len(&self) -> usize {
        self.doomed.len()
    }

    /// Upload a pending payload and record it for rollback.
    pub async fn upload(&mut self, upload: &PendingUpload) -> Result<UploadedMedia, MediaError> {
        let media = self.media.upload(upload, &self.folder).await?;
        self.uploaded.push(media.clone());
        Ok(media)
    }

    /// The write failed: best-effort delete everything uploaded in this
    /// attempt. Nothing queued in `doomed` is touched: the persisted
    /// state still references those objects.
    pub async fn rollback_uploads(self) {
        for media in &self.uploaded {
            match self.media.delete(&media.key).await {
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Failed to roll back uploaded media {}: {e}", media.key)
                }
            }
        }
    }

    /// The transaction committed: best-effort delete every superseded
    /// object. Per-key failures are logged and skipped; the write already
    /// succeeded.
    pub async fn finish(self) {
        for key in &self.doomed {
            match self.media.delete(key).await {
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to delete superseded media {key}: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::media::memory::MemoryMediaStore;

    fn pending(name: &str) -> PendingUpload {
        PendingUpload::new(b"bytes".to_vec(), name.into(), Some("image/png".into()))
    }

    #[tokio::test]
    async fn rollback_deletes_only_this_attempts_uploads() {
        let store = Arc::new(MemoryMediaStore::default());
        let existing = store
            .upload(&pending("old.png"), "pages/safe")
            .await
            .unwrap();

        let mut plan = MediaPlan::new(store.clone(), "pages/safe");
        plan.condemn(Some(existing.key.as_str()));
        let fresh = plan.upload(&pending("new.png")).await.unwrap();
        assert!(store.contains(&fresh.key));

        plan.rollback_uploads().await;

        assert!(!store.contains(&fresh.key));
        // The doomed key was never deleted: the old state still owns it.
        assert!(store.contains(&existing.key));
    }

    #[tokio::test]
    async fn finish_deletes_doomed_and_keeps_uploads() {
        let store = Arc::new(MemoryMediaStore::default());
        let existing = store
            .upload(&pending("old.png"), "pages/safe")
            .await
            .unwrap();

        let mut plan = MediaPlan::new(store.clone(), "pages/safe");
        plan.condemn(Some(existing.key.as_str()));
        let fresh = plan.upload(&pending("new.png")).await.unwrap();

        plan.finish().await;

        assert!(!store.contains(&existing.key));
        assert!(store.contains(&fresh.key));
    }

    #[tokio::test]
    async fn condemn_skips_unparseable_keys() {
        let store = Arc::new(MemoryMediaStore::default());
        let mut plan = MediaPlan::new(store, "pages/safe");
        plan.condemn(Some("../not/a/key"));
        plan.condemn(None);
        assert_eq!(plan.doomed_len(), 0);
    }

    #[test]
    fn slot_supersession_rules() {
        assert!(MediaSlot::Upload(pending("a.png")).supersedes_existing());
        assert!(MediaSlot::Clear.supersedes_existing());
        assert!(!MediaSlot::Keep.supersedes_existing());
    }
}
