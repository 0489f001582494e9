use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An ordered, owned child of a [`super::page`] record.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "section")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub page_id: i32,
    #[sea_orm(belongs_to, from = "page_id", to = "id")]
    pub page: HasOne<super::page::Entity>,

    /// Display order; conventionally sequential, not required unique.
    pub position: i32,

    pub title: Option<String>,
    pub description_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// "CARDSTYLE1" or "CARDSTYLE2".
    pub card_style: Option<String>,

    /// Image media slot: public URL plus the host's storage key.
    pub image_url: Option<String>,
    pub image_key: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
