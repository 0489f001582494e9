use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::technology_item;
use crate::error::AppError;

use super::shared::{validate_optional_position, validate_title};

/// JSON `payload` field of a technology-item create; an optional `image`
/// file part travels beside it.
#[derive(Deserialize)]
pub struct CreateTechnologyForm {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i32>,
}

/// JSON `payload` field of a technology-item update (full-state PUT).
#[derive(Deserialize, Default)]
pub struct UpdateTechnologyForm {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i32>,
    #[serde(default)]
    pub remove_image: bool,
}

pub fn validate_create_technology(form: &CreateTechnologyForm) -> Result<(), AppError> {
    validate_title(&form.title)?;
    validate_optional_position(form.position)
}

pub fn validate_update_technology(form: &UpdateTechnologyForm) -> Result<(), AppError> {
    validate_title(&form.title)?;
    validate_optional_position(form.position)
}

/// Response DTO for a technology showcase entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TechnologyBody {
    pub id: i32,
    #[schema(example = "3D intraoral scanner")]
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<technology_item::Model> for TechnologyBody {
    fn from(m: technology_item::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            position: m.position,
            image_url: m.image_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
