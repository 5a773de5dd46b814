//! Draft handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use projecthub_entity::draft::Draft;
use projecthub_service::file::FileContent;

use crate::dto::ApiResponse;
use crate::dto::request::{PathQuery, RestoreDraftRequest, SaveDraftRequest, validated};
use crate::dto::response::RemovedResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/drafts
pub async fn list_drafts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Draft>>>, ApiError> {
    let drafts = state.draft_service.list_drafts(&auth, workspace_id).await?;
    Ok(Json(ApiResponse::ok(drafts)))
}

/// PUT /api/workspaces/{workspace_id}/drafts
pub async fn save_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<SaveDraftRequest>,
) -> Result<Json<ApiResponse<Draft>>, ApiError> {
    let body = validated(body)?;
    let draft = state
        .draft_service
        .save_draft(&auth, workspace_id, &body.path, body.content)
        .await?;
    Ok(Json(ApiResponse::ok(draft)))
}

/// POST /api/workspaces/{workspace_id}/drafts/restore
pub async fn restore_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<RestoreDraftRequest>,
) -> Result<Json<ApiResponse<FileContent>>, ApiError> {
    let body = validated(body)?;
    let content = state
        .draft_service
        .restore_draft(&auth, workspace_id, &body.path, body.draft_id)
        .await?;
    Ok(Json(ApiResponse::ok(content)))
}

/// DELETE /api/workspaces/{workspace_id}/drafts?path=
pub async fn discard_draft(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ApiResponse<RemovedResponse>>, ApiError> {
    let query = validated(query)?;
    let removed = state
        .draft_service
        .discard_draft(&auth, workspace_id, &query.path)
        .await?;
    Ok(Json(ApiResponse::ok(RemovedResponse { removed })))
}
