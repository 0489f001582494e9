use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use tracing::instrument;

use crate::entity::technology_item;
use crate::error::{AppError, ErrorBody};
use crate::models::shared::ApiResponse;
use crate::models::technology::{
    CreateTechnologyForm, TechnologyBody, UpdateTechnologyForm, validate_create_technology,
    validate_update_technology,
};
use crate::state::AppState;
use crate::store::{MediaPlan, MediaSlot};

use super::upload::MultipartForm;

const MEDIA_FOLDER: &str = "technology";

#[utoipa::path(
    get,
    path = "/api/technologies",
    tag = "Technology",
    operation_id = "listTechnologies",
    summary = "List technology showcase entries",
    description = "Returns all entries ordered by position, in the standard envelope.",
    responses((status = 200, description = "Technology list", body = Vec<TechnologyBody>)),
)]
#[instrument(skip(state))]
pub async fn list_technologies(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TechnologyBody>>>, AppError> {
    let rows = technology_item::Entity::find()
        .order_by_asc(technology_item::Column::Position)
        .order_by_asc(technology_item::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(TechnologyBody::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/technologies",
    tag = "Technology",
    operation_id = "createTechnology",
    summary = "Create a technology entry",
    description = "Multipart body: JSON `payload` field plus an optional `image` file.",
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional image"),
    responses(
        (status = 201, description = "Entry created", body = TechnologyBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_technology(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: CreateTechnologyForm = form.payload()?;
    validate_create_technology(&payload)?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    let uploaded = match form.take_file("image") {
        Some(file) => Some(plan.upload(&file.into_pending_upload()).await?),
        None => None,
    };

    let db_result: Result<technology_item::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let position = match payload.position {
            Some(p) => p,
            None => next_position(&txn).await?,
        };

        let now = Utc::now();
        let mut active = technology_item::ActiveModel {
            title: Set(payload.title.trim().to_string()),
            description: Set(payload.description.clone()),
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
        Json(ApiResponse::ok(TechnologyBody::from(model))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/technologies/{id}",
    tag = "Technology",
    operation_id = "updateTechnology",
    summary = "Update a technology entry",
    description = "Full-state update. A new `image` file replaces the current one (the old \
        object is deleted from the host after the write commits); `remove_image` clears it.",
    params(("id" = i32, Path, description = "Technology entry ID")),
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional image"),
    responses(
        (status = 200, description = "Entry updated", body = TechnologyBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Entry not found", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_technology(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TechnologyBody>>, AppError> {
    let existing = find_technology(&state, id).await?;

    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: UpdateTechnologyForm = form.payload()?;
    validate_update_technology(&payload)?;

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

    let db_result: Result<technology_item::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let now = Utc::now();
        let mut active: technology_item::ActiveModel = existing.clone().into();
        active.title = Set(payload.title.trim().to_string());
        active.description = Set(payload.description.clone());
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

    Ok(Json(ApiResponse::ok(TechnologyBody::from(model))))
}

#[utoipa::path(
    delete,
    path = "/api/technologies/{id}",
    tag = "Technology",
    operation_id = "deleteTechnology",
    summary = "Delete a technology entry",
    description = "Deletes the row, then best-effort deletes its image from the media host.",
    params(("id" = i32, Path, description = "Technology entry ID")),
    responses(
        (status = 200, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_technology(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let existing = find_technology(&state, id).await?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    plan.condemn(existing.image_key.as_deref());

    technology_item::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    plan.finish().await;

    Ok(Json(ApiResponse::empty()))
}

async fn find_technology(state: &AppState, id: i32) -> Result<technology_item::Model, AppError> {
    technology_item::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Technology entry not found".into()))
}

async fn next_position<C: sea_orm::ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let last = technology_item::Entity::find()
        .order_by_desc(technology_item::Column::Position)
        .one(db)
        .await?;
    Ok(last.map(|m| m.position + 1).unwrap_or(0))
}
