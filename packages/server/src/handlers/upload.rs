use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::input::AppQuery;
use crate::models::shared::{Pagination, page_window};
use crate::models::upload::*;
use crate::state::AppState;
use crate::uploads::{DeleteOutcome, UploadService};

#[utoipa::path(
    get,
    path = "/uploads",
    tag = "Uploads",
    operation_id = "listUploads",
    summary = "List the caller's uploads",
    description = "Upload history, newest first. `limit` is clamped to 1-50.",
    params(UploadListQuery),
    responses(
        (status = 200, description = "Page of uploads", body = UploadListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_uploads(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadListQuery>,
) -> Result<Json<UploadListResponse>, AppError> {
    let (page, limit) = page_window(query.page, query.limit, 10, 50);

    let (uploads, total) = UploadService::new(&state.db)
        .list(auth_user.user_id, page, limit)
        .await?;

    Ok(Json(UploadListResponse {
        data: uploads.into_iter().map(UploadResponse::from).collect(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[utoipa::path(
    get,
    path = "/uploads/{id}",
    tag = "Uploads",
    operation_id = "getUpload",
    summary = "Get an upload with buyer totals",
    params(("id" = i32, Path, description = "Upload ID")),
    responses(
        (status = 200, description = "Upload and its summary", body = UploadDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Upload not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_upload(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UploadDetailResponse>, AppError> {
    let service = UploadService::new(&state.db);

    let upload = service
        .find(auth_user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Upload not found".into()))?;
    let summary = service.summary(upload.id).await?;

    Ok(Json(UploadDetailResponse {
        upload: UploadResponse::from(upload),
        summary,
    }))
}

#[utoipa::path(
    delete,
    path = "/uploads/{id}",
    tag = "Uploads",
    operation_id = "deleteUpload",
    summary = "Delete an upload and all buyers imported from it",
    params(("id" = i32, Path, description = "Upload ID")),
    responses(
        (status = 200, description = "Upload deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Upload not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_upload(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    match UploadService::new(&state.db)
        .delete(auth_user.user_id, id)
        .await?
    {
        DeleteOutcome::Deleted { .. } => Ok(Json(MessageResponse {
            message: "Upload deleted successfully".into(),
        })),
        DeleteOutcome::NotFound => Err(AppError::NotFound("Upload not found".into())),
    }
}
