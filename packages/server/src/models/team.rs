use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::team_member;
use crate::error::AppError;

use super::shared::{validate_optional_position, validate_title};

/// JSON `payload` field of a team-member create; an optional `image`
/// file part (the portrait) travels beside it.
#[derive(Deserialize)]
pub struct CreateTeamMemberForm {
    pub name: String,
    /// Job title, e.g. "Orthodontist".
    pub role: Option<String>,
    pub bio: Option<String>,
    pub position: Option<i32>,
}

/// JSON `payload` field of a team-member update (full-state PUT).
#[derive(Deserialize, Default)]
pub struct UpdateTeamMemberForm {
    pub name: String,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub position: Option<i32>,
    #[serde(default)]
    pub remove_image: bool,
}

pub fn validate_create_team_member(form: &CreateTeamMemberForm) -> Result<(), AppError> {
    validate_title(&form.name)?;
    validate_optional_position(form.position)
}

pub fn validate_update_team_member(form: &UpdateTeamMemberForm) -> Result<(), AppError> {
    validate_title(&form.name)?;
    validate_optional_position(form.position)
}

/// Response DTO for a team member.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TeamMemberBody {
    pub id: i32,
    #[schema(example = "Dr. Elena Petrova")]
    pub name: String,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub position: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team_member::Model> for TeamMemberBody {
    fn from(m: team_member::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            role: m.role,
            bio: m.bio,
            position: m.position,
            image_url: m.image_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
