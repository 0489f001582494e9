use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::service;
use crate::error::AppError;

use super::shared::{validate_optional_position, validate_title};

/// JSON `payload` field of a service create; an optional `image` file
/// part travels beside it.
#[derive(Deserialize)]
pub struct CreateServiceForm {
    pub title: String,
    pub description: Option<String>,
    /// Auto-assigned to the end of the list when omitted.
    pub position: Option<i32>,
}

/// JSON `payload` field of a service update (full-state PUT).
#[derive(Deserialize, Default)]
pub struct UpdateServiceForm {
    pub title: String,
    pub description: Option<String>,
    pub position: Option<i32>,
    /// Empty the image slot (ignored when a new file is attached).
    #[serde(default)]
    pub remove_image: bool,
}

pub fn validate_create_service(form: &CreateServiceForm) -> Result<(), AppError> {
    validate_title(&form.title)?;
    validate_optional_position(form.position)
}

pub fn validate_update_service(form: &UpdateServiceForm) -> Result<(), AppError> {
    validate_title(&form.title)?;
    validate_optional_position(form.position)
}

/// Response DTO for a clinic service.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ServiceBody {
    pub id: i32,
    #[schema(example = "Teeth whitening")]
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<service::Model> for ServiceBody {
    fn from(m: service::Model) -> Self {
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
