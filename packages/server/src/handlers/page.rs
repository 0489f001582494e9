use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::media::MediaKind;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::page::{PageBody, PageForm, validate_page_form};
use crate::models::shared::ApiResponse;
use crate::state::AppState;
use crate::store::{MediaSlot, PageDraft, PageKind, SectionDraft, SingletonContentStore};

use super::upload::MultipartForm;

fn store_for(state: &AppState, kind: &str) -> Result<SingletonContentStore, AppError> {
    let kind: PageKind = kind
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown content kind '{kind}'")))?;
    Ok(SingletonContentStore::new(
        state.db.clone(),
        state.media.clone(),
        kind,
    ))
}

#[utoipa::path(
    get,
    path = "/api/pages/{kind}",
    tag = "Pages",
    operation_id = "getPage",
    summary = "Read a singleton page",
    description = "Returns the page with its ordered sections inside the standard \
        `{success, data}` envelope. `data` is `null` when the page has never been saved.",
    params(("kind" = String, Path, description = "Content kind slug, e.g. `safe`")),
    responses(
        (status = 200, description = "Page (or null)", body = PageBody),
        (status = 404, description = "Unknown content kind", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<Option<PageBody>>>, AppError> {
    let store = store_for(&state, &kind)?;
    let page = store.read().await?.map(PageBody::from);
    Ok(Json(ApiResponse::ok(page)))
}

#[utoipa::path(
    post,
    path = "/api/pages/{kind}",
    tag = "Pages",
    operation_id = "createPage",
    summary = "Create (or overwrite) a singleton page",
    description = "Full-state write. The `payload` multipart field carries the JSON form; \
        file parts are named `background` and `section_image_{index}`. The write creates \
        the record if none exists and collapses accidental duplicates to the \
        earliest-created row.",
    params(("kind" = String, Path, description = "Content kind slug")),
    request_body(content_type = "multipart/form-data", description = "JSON payload plus media files"),
    responses(
        (status = 201, description = "Page written", body = PageBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Unknown content kind", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let body = write_page(state, kind, multipart).await?;
    Ok((StatusCode::CREATED, body))
}

#[utoipa::path(
    put,
    path = "/api/pages/{kind}",
    tag = "Pages",
    operation_id = "updatePage",
    summary = "Update a singleton page",
    description = "Same full-state write as POST: sections keep their identity when their \
        `id` is echoed back, sections whose id is omitted are deleted, id-less sections \
        are created. Replaced media is deleted from the host only after the write commits.",
    params(("kind" = String, Path, description = "Content kind slug")),
    request_body(content_type = "multipart/form-data", description = "JSON payload plus media files"),
    responses(
        (status = 200, description = "Page written", body = PageBody),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Unknown content kind", body = ErrorBody),
        (status = 502, description = "Media upload failed", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let body = write_page(state, kind, multipart).await?;
    Ok((StatusCode::OK, body))
}

#[utoipa::path(
    delete,
    path = "/api/pages/{kind}",
    tag = "Pages",
    operation_id = "deletePage",
    summary = "Delete a singleton page",
    description = "Removes the page (duplicates included), its sections, and best-effort \
        deletes their media from the host.",
    params(("kind" = String, Path, description = "Content kind slug")),
    responses(
        (status = 200, description = "Page deleted"),
        (status = 404, description = "Unknown kind or nothing to delete", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let store = store_for(&state, &kind)?;
    if !store.delete().await? {
        return Err(AppError::NotFound(format!("No '{kind}' page exists")));
    }
    Ok(Json(ApiResponse::empty()))
}

/// Shared POST/PUT path: parse the multipart form into a draft and hand
/// it to the store.
async fn write_page(
    state: AppState,
    kind: String,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<PageBody>>, AppError> {
    let store = store_for(&state, &kind)?;

    let mut form =
        MultipartForm::collect(&mut multipart, state.config.media.max_upload_size).await?;
    let payload: PageForm = form.payload()?;
    validate_page_form(&payload)?;

    let background = match form.take_file("background") {
        Some(file) => {
            let mut pending = file.into_pending_upload();
            if let Some(ref selected) = payload.background_kind {
                pending = pending.with_kind(parse_background_kind(selected)?);
            }
            MediaSlot::Upload(pending)
        }
        None if payload.remove_background => MediaSlot::Clear,
        None => MediaSlot::Keep,
    };

    let sections: Vec<SectionDraft> = payload
        .sections
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let image = match form.take_file(&format!("section_image_{i}")) {
                Some(file) => MediaSlot::Upload(file.into_pending_upload()),
                None if s.remove_image => MediaSlot::Clear,
                None => MediaSlot::Keep,
            };
            SectionDraft {
                id: s.id,
                position: s.position.unwrap_or(i as i32),
                title: s.title.clone(),
                description_title: s.description_title.clone(),
                description: s.description.clone(),
                card_style: s.card_style.clone(),
                image,
            }
        })
        .collect();

    let draft = PageDraft {
        title: payload.title,
        subtitle: payload.subtitle,
        description: payload.description,
        background,
        sections,
    };

    let written = store.write(draft).await?;
    Ok(Json(ApiResponse::ok(PageBody::from(written))))
}

fn parse_background_kind(selected: &str) -> Result<MediaKind, AppError> {
    match selected {
        "image" => Ok(MediaKind::Image),
        "video" => Ok(MediaKind::Video),
        other => Err(AppError::Validation(format!(
            "background_kind must be image or video, got {other}"
        ))),
    }
}
