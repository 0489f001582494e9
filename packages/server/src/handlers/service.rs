use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use tracing::instrument;

use crate::entity::service;
use crate::error::{AppError, ErrorBody};
use crate::models::service::{
    CreateServiceForm, ServiceBody, UpdateServiceForm, validate_create_service,
    validate_update_service,
};
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::store::{MediaPlan, MediaSlot};

use super::upload::MultipartForm;

const MEDIA_FOLDER: &str = "services";

#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    operation_id = "listServices",
    summary = "List clinic services",
    description = "Returns all services ordered by position, in the standard envelope.",
    responses((status = 200, description = "Service list", body = Vec<ServiceBody>)),
)]
#[instrument(skip(state))]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ServiceBody>>>, AppError> {
    let rows = service::Entity::find()
        .order_by_asc(service::Column::Position)
        .order_by_asc(service::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::ok(
        rows.into_iter().map(ServiceBody::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    operation_id = "createService",
    summary = "Create a service",
    description = "Multipart body: JSON `payload` field plus an optional `image` file. \
        Position is appended to the end of the list when omitted.",
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional image"),
    responses(
        (status = 201, description = "Service created", body = ServiceBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_service(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: CreateServiceForm = form.payload()?;
    validate_create_service(&payload)?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    let uploaded = match form.take_file("image") {
        Some(file) => Some(plan.upload(&file.into_pending_upload()).await?),
        None => None,
    };

    let db_result: Result<service::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let position = match payload.position {
            Some(p) => p,
            None => next_position(&txn).await?,
        };

        let now = Utc::now();
        let mut active = service::ActiveModel {
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
        Json(ApiResponse::ok(ServiceBody::from(model))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Services",
    operation_id = "updateService",
    summary = "Update a service",
    description = "Full-state update. A new `image` file replaces the current one (the old \
        object is deleted from the host after the write commits); `remove_image` clears it.",
    params(("id" = i32, Path, description = "Service ID")),
    request_body(content_type = "multipart/form-data", description = "JSON payload plus optional image"),
    responses(
        (status = 200, description = "Service updated", body = ServiceBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Service not found", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ServiceBody>>, AppError> {
    let existing = find_service(&state, id).await?;

    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: UpdateServiceForm = form.payload()?;
    validate_update_service(&payload)?;

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

    let db_result: Result<service::Model, AppError> = async {
        let txn = state.db.begin().await?;

        let now = Utc::now();
        let mut active: service::ActiveModel = existing.clone().into();
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

    Ok(Json(ApiResponse::ok(ServiceBody::from(model))))
}

#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    operation_id = "deleteService",
    summary = "Delete a service",
    description = "Deletes the row, then best-effort deletes its image from the media host.",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service deleted"),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let existing = find_service(&state, id).await?;

    let mut plan = MediaPlan::new(state.media.clone(), MEDIA_FOLDER);
    plan.condemn(existing.image_key.as_deref());

    service::Entity::delete_by_id(id).exec(&state.db).await?;
    plan.finish().await;

    Ok(Json(ApiResponse::empty()))
}

async fn find_service(state: &AppState, id: i32) -> Result<service::Model, AppError> {
    service::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))
}

async fn next_position<C: sea_orm::ConnectionTrait>(db: &C) -> Result<i32, AppError> {
    let last = service::Entity::find()
        .order_by_desc(service::Column::Position)
        .one(db)
        .await?;
    Ok(last.map(|m| m.position + 1).unwrap_or(0))
}
