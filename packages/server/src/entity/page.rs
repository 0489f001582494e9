use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A settings-like content record with at most one live instance per kind.
///
/// `kind` is indexed but deliberately not unique: duplicates can appear
/// (historical bugs, racing first writes) and are collapsed to the
/// earliest-created row on the next write.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Content kind slug, e.g. "homepage", "safe", "patient-instructions".
    #[sea_orm(indexed)]
    pub kind: String,

    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Background media slot (homepage only in practice).
    pub background_url: Option<String>,
    pub background_key: Option<String>,
    /// "image" or "video"; mirrors the media host's resource type.
    pub background_kind: Option<String>,

    #[sea_orm(has_many)]
    pub sections: HasMany<super::section::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
