use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{page, section};
use crate::error::AppError;
use crate::store::PageWithSections;

use super::shared::{validate_card_style, validate_optional_position, validate_title};

/// JSON `payload` field of a singleton page write.
///
/// File parts travel beside it in the same multipart body: `background`
/// for the page-level slot, `section_image_{index}` for the section at
/// that index of `sections`.
#[derive(Deserialize, Default)]
pub struct PageForm {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// Explicit resource kind for a new background upload ("image" or
    /// "video"); inferred from the file when omitted.
    pub background_kind: Option<String>,
    /// Empty the background slot (ignored when a new file is attached).
    #[serde(default)]
    pub remove_background: bool,
    #[serde(default)]
    pub sections: Vec<SectionForm>,
}

#[derive(Deserialize, Default)]
pub struct SectionForm {
    /// Present for sections that already exist; omitted for new ones.
    pub id: Option<i32>,
    /// Display order; defaults to the array index.
    pub position: Option<i32>,
    pub title: Option<String>,
    pub description_title: Option<String>,
    pub description: Option<String>,
    pub card_style: Option<String>,
    /// Empty this section's image slot (ignored when a new file is
    /// attached for this index).
    #[serde(default)]
    pub remove_image: bool,
}

pub fn validate_page_form(form: &PageForm) -> Result<(), AppError> {
    if let Some(ref title) = form.title {
        validate_title(title)?;
    }
    for s in &form.sections {
        if let Some(ref title) = s.title {
            validate_title(title)?;
        }
        validate_optional_position(s.position)?;
        validate_card_style(s.card_style.as_deref())?;
    }
    Ok(())
}

/// A media slot as rendered to clients.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaBody {
    /// Publicly resolvable URL on the media host.
    #[schema(example = "https://media.example.com/pages/safe/xray-a1b2c3d4.png")]
    pub url: String,
    /// "image", "video" or "raw".
    #[schema(example = "image")]
    pub kind: Option<String>,
}

/// Response DTO for a singleton page with its ordered sections.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PageBody {
    pub id: i32,
    #[schema(example = "safe")]
    pub kind: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub background: Option<MediaBody>,
    pub sections: Vec<SectionBody>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SectionBody {
    pub id: i32,
    pub position: i32,
    pub title: Option<String>,
    pub description_title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "CARDSTYLE1")]
    pub card_style: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<section::Model> for SectionBody {
    fn from(m: section::Model) -> Self {
        Self {
            id: m.id,
            position: m.position,
            title: m.title,
            description_title: m.description_title,
            description: m.description,
            card_style: m.card_style,
            image_url: m.image_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<PageWithSections> for PageBody {
    fn from(state: PageWithSections) -> Self {
        let page::Model {
            id,
            kind,
            title,
            subtitle,
            description,
            background_url,
            background_kind,
            created_at,
            updated_at,
            ..
        } = state.page;

        Self {
            id,
            kind,
            title,
            subtitle,
            description,
            background: background_url.map(|url| MediaBody {
                url,
                kind: background_kind,
            }),
            sections: state.sections.into_iter().map(SectionBody::from).collect(),
            created_at,
            updated_at,
        }
    }
}
