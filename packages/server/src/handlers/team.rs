use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use tracing::instrument;

use crate::entity::team_member;
use crate::error::{AppError, ErrorBody};
use crate::models::shared::ApiResponse;
use crate::models::team::{
    CreateTeamMemberForm, TeamMemberBody, UpdateTeamMemberForm, validate_create_team_member,
    validate_update_team_member,
};
use crate::state::AppState;
use crate::store::{MediaPlan, MediaSlot};

use super::upload::MultipartForm;

const MEDIA_FOLDER: &str = "team";

#[utoipa::path(
    get,
    path = "/api/team",
    tag = "Team",
    operation_id = "listTeamMembers",
    summary = "List team members",
    description = "Returns all team members ordered by position, in the standard envelope.",
    responses((status = 200, description = "Team roster", body = Vec<TeamMemberBody>)),
)]
#[instrument(skip(state))]
pub async fn list_team_members(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TeamMemberBody>>>, AppError> {
    let rows = team_member::Entity::find()
        .order_by_asc(team_member::Column::Position)
        .order_by_asc(team_member::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(TeamMemberBody::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/team",
    tag = "Team",
    operation_id = "createTeamMember",
    summary = "Add a team member",
    description = "Multipart body: JSON `payload` field plus an optional `image` portrait.",
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional portrait"),
    responses(
        (status = 201, description = "Team member created", body = TeamMemberBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_team_member(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: CreateTeamMemberForm = form.payload()?;
    validate_create_team_member(&payload)?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    let uploaded = match form.take_file("image") {
        Some(file) => Some(plan.upload(&file.into_pending_upload()).await?),
        None => None,
    };

    let db_result: Result<team_member::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let position = match payload.position {
            Some(p) => p,
            None => next_position(&txn).await?,
        };

        let now = Utc::now();
        let mut active = team_member::ActiveModel {
            name: Set(payload.name.trim().to_string()),
            role: Set(payload.role.clone()),
            bio: Set(payload.bio.clone()),
            position: Set(position),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(media) = uploaded.as_ref() {
            active.image_url = Set(Some(media.url.clone()));
            active.image_key = Set(Some(media.key.as_str().to_string()));
        }

        let model = active.insert(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }
    .await;

    let model = match db_result {
        Ok(model) => model,
        Err(err) => {
            plan.rollback_uploads().await;
            return Err(err);
        }
    };
    plan.finish().await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TeamMemberBody::from(model))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/team/{id}",
    tag = "Team",
    operation_id = "updateTeamMember",
    summary = "Update a team member",
    description = "Full-state update. A new `image` file replaces the portrait (the old \
        object is deleted from the host after the write commits); `remove_image` clears it.",
    params(("id" = i32, Path, description = "Team member ID")),
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional portrait"),
    responses(
        (status = 200, description = "Team member updated", body = TeamMemberBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Team member not found", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_team_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TeamMemberBody>>, AppError> {
    let existing = find_team_member(&state, id).await?;

    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: UpdateTeamMemberForm = form.payload()?;
    validate_update_team_member(&payload)?;

    let slot = match form.take_file("image") {
        Some(file) => MediaSlot::Upload(file.into_pending_upload()),
        None if payload.remove_image => MediaSlot::Clear,
        None => MediaSlot::Keep,
    };

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    if slot.supersedes_existing() {
        plan.condemn(existing.image_key.as_deref());
    }
    let uploaded = match &slot {
        MediaSlot::Upload(pending) => Some(plan.upload(pending).await?),
        _ => None,
    };

    let db_result: Result<team_member::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let now = Utc::now();
        let mut active: team_member::ActiveModel = existing.clone().into();
        active.name = Set(payload.name.trim().to_string());
        active.role = Set(payload.role.clone());
        active.bio = Set(payload.bio.clone());
        if let Some(position) = payload.position {
            active.position = Set(position);
        }
        match (&slot, uploaded.as_ref()) {
            (MediaSlot::Upload(_), Some(media)) => {
                active.image_url = Set(Some(media.url.clone()));
                active.image_key = Set(Some(media.key.as_str().to_string()));
            }
            (MediaSlot::Upload(_), None) => {
                return Err(AppError::Internal(
                    "image upload missing after upload phase".into(),
                ));
            }
            (MediaSlot::Clear, _) => {
                active.image_url = Set(None);
                active.image_key = Set(None);
            }
            (MediaSlot::Keep, _) => {}
        }
        active.updated_at = Set(now);

        let model = active.update(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }
    .await;

    let model = match db_result {
        Ok(model) => model,
        Err(err) => {
            plan.rollback_uploads().await;
            return Err(err);
        }
    };
    plan.finish().await;

    Ok(Json(ApiResponse::ok(TeamMemberBody::from(model))))
}

#[utoipa::path(
    delete,
    path = "/api/team/{id}",
    tag = "Team",
    operation_id = "deleteTeamMember",
    summary = "Remove a team member",
    description = "Deletes the row, then best-effort deletes the portrait from the media host.",
    params(("id" = i32, Path, description = "Team member ID")),
    responses(
        (status = 200, description = "Team member deleted"),
        (status = 404, description = "Team member not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_team_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let existing = find_team_member(&state, id).await?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    plan.condemn(existing.image_key.as_deref());

    team_member::Entity::delete_by_id(id).exec(&state.db).await?;
    plan.finish().await;

    Ok(Json(ApiResponse::empty()))
}

async fn find_team_member(state: &AppState, id: i32) -> Result<team_member::Model, AppError> {
    team_member::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team member not found".into()))
}

async fn next_position<C: sea_orm::ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let last = team_member::Entity::find()
        .order_by_desc(team_member::Column::Position)
        .one(db)
        .await?;
    Ok(last.map(|m| m.position + 1).unwrap_or(0))
}
