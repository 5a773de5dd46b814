//! Structural mutation handlers: create, delete, move, copy.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use projecthub_entity::file::FileNode;

use crate::dto::ApiResponse;
use crate::dto::request::{
    CreateDirectoryRequest, CreateFileRequest, PathQuery, TransferRequest, validated,
};
use crate::dto::response::RemovedResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

type Created = (StatusCode, Json<ApiResponse<FileNode>>);

/// POST /api/workspaces/{workspace_id}/files
pub async fn create_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateFileRequest>,
) -> Result<Created, ApiError> {
    let body = validated(body)?;
    let node = state
        .file_service
        .create_file(&auth, workspace_id, &body.path, body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// POST /api/workspaces/{workspace_id}/directories
pub async fn create_directory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateDirectoryRequest>,
) -> Result<Created, ApiError> {
    let body = validated(body)?;
    let node = state
        .file_service
        .create_directory(&auth, workspace_id, &body.path)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// DELETE /api/workspaces/{workspace_id}/files?path=
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<RemovedResponse>>, ApiError> {
    let query = validated(query)?;
    state
        .file_service
        .delete_file(&auth, workspace_id, &query.path)
        .await?;
    Ok(Json(ApiResponse::ok(RemovedResponse { removed: true })))
}

/// POST /api/workspaces/{workspace_id}/files/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<ApiResponse<FileNode>>, ApiError> {
    let body = validated(body)?;
    let node = state
        .file_service
        .move_file(&auth, workspace_id, &body.from, &body.to)
        .await?;
    Ok(Json(ApiResponse::ok(node)))
}

/// POST /api/workspaces/{workspace_id}/files/copy
pub async fn copy_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<TransferRequest>,
) -> Result<Created, ApiError> {
    let body = validated(body)?;
    let node = state
        .file_service
        .copy_file(&auth, workspace_id, &body.from, &body.to)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}
