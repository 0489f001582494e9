use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use common::media::{MediaStore, UploadedMedia};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entity::{page, section};
use crate::error::AppError;

use super::kind::PageKind;
use super::media_plan::{MediaPlan, MediaSlot};

/// Desired full state for a singleton page.
#[derive(Default)]
pub struct PageDraft {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub background: MediaSlot,
    pub sections: Vec<SectionDraft>,
}

/// Desired state for one section. `id: None` creates a new section;
/// `id: Some` updates the section with that identity. Persisted sections
/// whose id is absent from the draft are deleted.
#[derive(Default)]
pub struct SectionDraft {
    pub id: Option<i32>,
    pub position: i32,
    pub title: Option<String>,
    pub description_title: Option<String>,
    pub description: Option<String>,
    pub card_style: Option<String>,
    pub image: MediaSlot,
}

/// A page together with its sections, ordered by position then id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWithSections {
    pub page: page::Model,
    pub sections: Vec<section::Model>,
}

/// Reconciles desired state for one singleton content kind against the
/// persisted state: at most one `page` row per kind survives a successful
/// write, section identity is stable across edits, and externally-hosted
/// media is uploaded before the transaction and cleaned up after it.
///
/// Concurrent overlapping writes for the same kind are not serialized.
/// The transaction keeps the rows consistent, but two racing writes can
/// disagree on whose upload becomes the final URL, and the loser's fresh
/// object is orphaned on the media host. Callers needing single-writer
/// semantics must serialize externally.
pub struct SingletonContentStore {
    db: DatabaseConnection,
    media: Arc<dyn MediaStore>,
    kind: PageKind,
}

impl SingletonContentStore {
    pub fn new(db: DatabaseConnection, media: Arc<dyn MediaStore>, kind: PageKind) -> Self {
        Self { db, media, kind }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Current state of this kind, or `None` if it has never been written.
    ///
    /// Reads are side-effect free: duplicate rows are tolerated here and
    /// collapsed by the next `write`.
    pub async fn read(&self) -> Result<Option<PageWithSections>, AppError> {
        let pages = self.load_all(&self.db).await?;
        let Some(canonical) = pages.into_iter().next() else {
            return Ok(None);
        };
        let sections = ordered_sections(&self.db, canonical.id).await?;
        Ok(Some(PageWithSections {
            page: canonical,
            sections,
        }))
    }

    /// Reconcile the desired state against the persisted state.
    ///
    /// Uploads happen first, outside any transaction; the row mutation is
    /// one all-or-nothing transaction; superseded media is deleted only
    /// after the commit. A failure before the commit rolls back this
    /// attempt's uploads and leaves the persisted state untouched.
    pub async fn write(&self, draft: PageDraft) -> Result<PageWithSections, AppError> {
        validate_draft(&draft)?;

        // Snapshot the persisted state. The earliest-created row is
        // canonical; any later duplicates are collapsed below.
        let pages = self.load_all(&self.db).await?;
        let mut pages = pages.into_iter();
        let canonical = pages.next();
        let duplicates: Vec<page::Model> = pages.collect();

        let canonical_sections = match &canonical {
            Some(p) => ordered_sections(&self.db, p.id).await?,
            None => Vec::new(),
        };
        let known: HashMap<i32, section::Model> = canonical_sections
            .iter()
            .map(|s| (s.id, s.clone()))
            .collect();
        let desired_ids: HashSet<i32> = draft.sections.iter().filter_map(|s| s.id).collect();

        // Media delta: everything the committed state will no longer
        // reference gets queued for deletion-after-commit.
        let mut plan = MediaPlan::new(self.media.clone(), self.kind.media_folder());

        if draft.background.supersedes_existing()
            && let Some(p) = &canonical
        {
            plan.condemn(p.background_key.as_deref());
        }
        for s in &draft.sections {
            if s.image.supersedes_existing()
                && let Some(id) = s.id
                && let Some(existing) = known.get(&id)
            {
                plan.condemn(existing.image_key.as_deref());
            }
        }
        for existing in &canonical_sections {
            if !desired_ids.contains(&existing.id) {
                plan.condemn(existing.image_key.as_deref());
            }
        }

        let duplicate_ids: Vec<i32> = duplicates.iter().map(|p| p.id).collect();
        for dup in &duplicates {
            plan.condemn(dup.background_key.as_deref());
        }
        if !duplicate_ids.is_empty() {
            let dup_sections = section::Entity::find()
                .filter(section::Column::PageId.is_in(duplicate_ids.clone()))
                .all(&self.db)
                .await?;
            for s in &dup_sections {
                plan.condemn(s.image_key.as_deref());
            }
        }

        // Uploads, outside any transaction. A failure here leaves the
        // database untouched; only this attempt's uploads are deleted.
        let mut background_upload: Option<UploadedMedia> = None;
        let mut section_uploads: Vec<Option<UploadedMedia>> =
            Vec::with_capacity(draft.sections.len());
        let upload_result: Result<(), AppError> = async {
            if let MediaSlot::Upload(pending) = &draft.background {
                background_upload = Some(plan.upload(pending).await?);
            }
            for s in &draft.sections {
                let uploaded = match &s.image {
                    MediaSlot::Upload(pending) => Some(plan.upload(pending).await?),
                    _ => None,
                };
                section_uploads.push(uploaded);
            }
            Ok(())
        }
        .await;
        if let Err(err) = upload_result {
            plan.rollback_uploads().await;
            return Err(err);
        }

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let txn_result: Result<(), AppError> = async {
            // Ensure the canonical record exists; apply the scalars.
            let canonical_id = match &canonical {
                Some(p) => {
                    let mut active: page::ActiveModel = p.clone().into();
                    active.title = Set(draft.title.clone());
                    active.subtitle = Set(draft.subtitle.clone());
                    active.description = Set(draft.description.clone());
                    match (&draft.background, background_upload.as_ref()) {
                        (MediaSlot::Upload(_), Some(media)) => {
                            active.background_url = Set(Some(media.url.clone()));
                            active.background_key = Set(Some(media.key.as_str().to_string()));
                            active.background_kind = Set(Some(media.kind.as_str().to_string()));
                        }
                        (MediaSlot::Upload(_), None) => {
                            return Err(AppError::Internal(
                                "background upload missing after upload phase".into(),
                            ));
                        }
                        (MediaSlot::Clear, _) => {
                            active.background_url = Set(None);
                            active.background_key = Set(None);
                            active.background_kind = Set(None);
                        }
                        (MediaSlot::Keep, _) => {}
                    }
                    active.updated_at = Set(now);
                    active.update(&txn).await?;
                    p.id
                }
                None => {
                    let mut active = page::ActiveModel {
                        kind: Set(self.kind.as_str().to_string()),
                        title: Set(draft.title.clone()),
                        subtitle: Set(draft.subtitle.clone()),
                        description: Set(draft.description.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    if let Some(media) = background_upload.as_ref() {
                        active.background_url = Set(Some(media.url.clone()));
                        active.background_key = Set(Some(media.key.as_str().to_string()));
                        active.background_kind = Set(Some(media.kind.as_str().to_string()));
                    }
                    active.insert(&txn).await?.id
                }
            };

            // Collapse accidental duplicates and their sections.
            if !duplicate_ids.is_empty() {
                section::Entity::delete_many()
                    .filter(section::Column::PageId.is_in(duplicate_ids.clone()))
                    .exec(&txn)
                    .await?;
                page::Entity::delete_many()
                    .filter(page::Column::Id.is_in(duplicate_ids.clone()))
                    .exec(&txn)
                    .await?;
            }

            // A previously-known identity omitted from the draft is a
            // deletion.
            let orphaned: Vec<i32> = canonical_sections
                .iter()
                .map(|s| s.id)
                .filter(|id| !desired_ids.contains(id))
                .collect();
            if !orphaned.is_empty() {
                section::Entity::delete_many()
                    .filter(section::Column::Id.is_in(orphaned))
                    .exec(&txn)
                    .await?;
            }

            // Update by identity, insert the id-less.
            for (s, upload) in draft.sections.iter().zip(&section_uploads) {
                match s.id {
                    Some(id) => {
                        let existing = known.get(&id).ok_or_else(|| {
                            AppError::Validation(format!(
                                "Unknown section id {id} for page '{}'",
                                self.kind
                            ))
                        })?;
                        let mut active: section::ActiveModel = existing.clone().into();
                        active.position = Set(s.position);
                        active.title = Set(s.title.clone());
                        active.description_title = Set(s.description_title.clone());
                        active.description = Set(s.description.clone());
                        active.card_style = Set(s.card_style.clone());
                        match (&s.image, upload) {
                            (MediaSlot::Upload(_), Some(media)) => {
                                active.image_url = Set(Some(media.url.clone()));
                                active.image_key = Set(Some(media.key.as_str().to_string()));
                            }
                            (MediaSlot::Upload(_), None) => {
                                return Err(AppError::Internal(
                                    "section upload missing after upload phase".into(),
                                ));
                            }
                            (MediaSlot::Clear, _) => {
                                active.image_url = Set(None);
                                active.image_key = Set(None);
                            }
                            (MediaSlot::Keep, _) => {}
                        }
                        active.updated_at = Set(now);
                        active.update(&txn).await?;
                    }
                    None => {
                        let mut active = section::ActiveModel {
                            page_id: Set(canonical_id),
                            position: Set(s.position),
                            title: Set(s.title.clone()),
                            description_title: Set(s.description_title.clone()),
                            description: Set(s.description.clone()),
                            card_style: Set(s.card_style.clone()),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        };
                        if let Some(media) = upload {
                            active.image_url = Set(Some(media.url.clone()));
                            active.image_key = Set(Some(media.key.as_str().to_string()));
                        }
                        active.insert(&txn).await?;
                    }
                }
            }

            Ok(())
        }
        .await;

        if let Err(err) = txn_result {
            // Dropping the transaction rolls it back; the old media is
            // still referenced by the persisted rows, so only this
            // attempt's uploads are deleted.
            drop(txn);
            plan.rollback_uploads().await;
            return Err(err);
        }
        if let Err(err) = txn.commit().await {
            plan.rollback_uploads().await;
            return Err(err.into());
        }

        // Commit is the point of no return for the old media.
        plan.finish().await;

        self.read()
            .await?
            .ok_or_else(|| AppError::Internal("page missing after write".into()))
    }

    /// Administrative delete: removes the canonical record and any
    /// duplicates, cascades to sections, and best-effort deletes every
    /// media object they held. Returns `false` if nothing existed.
    pub async fn delete(&self) -> Result<bool, AppError> {
        let pages = self.load_all(&self.db).await?;
        if pages.is_empty() {
            return Ok(false);
        }

        let page_ids: Vec<i32> = pages.iter().map(|p| p.id).collect();
        let sections = section::Entity::find()
            .filter(section::Column::PageId.is_in(page_ids.clone()))
            .all(&self.db)
            .await?;

        let mut plan = MediaPlan::new(self.media.clone(), self.kind.media_folder());
        for p in &pages {
            plan.condemn(p.background_key.as_deref());
        }
        for s in &sections {
            plan.condemn(s.image_key.as_deref());
        }

        let txn = self.db.begin().await?;
        section::Entity::delete_many()
            .filter(section::Column::PageId.is_in(page_ids.clone()))
            .exec(&txn)
            .await?;
        page::Entity::delete_many()
            .filter(page::Column::Id.is_in(page_ids))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        plan.finish().await;
        Ok(true)
    }

    async fn load_all<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<page::Model>, AppError> {
        Ok(page::Entity::find()
            .filter(page::Column::Kind.eq(self.kind.as_str()))
            .order_by_asc(page::Column::CreatedAt)
            .order_by_asc(page::Column::Id)
            .all(db)
            .await?)
    }
}

/// Sections of a page in display order.
async fn ordered_sections<C: ConnectionTrait>(
    db: &C,
    page_id: i32,
) -> Result<Vec<section::Model>, AppError> {
    Ok(section::Entity::find()
        .filter(section::Column::PageId.eq(page_id))
        .order_by_asc(section::Column::Position)
        .order_by_asc(section::Column::Id)
        .all(db)
        .await?)
}

/// Structural checks only; domain-level field rules are the caller's job.
fn validate_draft(draft: &PageDraft) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for s in &draft.sections {
        if let Some(id) = s.id
            && !seen.insert(id)
        {
            return Err(AppError::Validation(format!(
                "Duplicate section id {id} in submitted sections"
            )));
        }
    }
    Ok(())
}
