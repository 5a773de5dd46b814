//! Version history handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use projecthub_service::version::{HistoryPage, RestoreOutcome, VersionComparison};

use crate::dto::ApiResponse;
use crate::dto::request::{CompareQuery, HistoryQuery, RestoreVersionRequest, validated};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/history
pub async fn list_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryPage>>, ApiError> {
    let query = validated(query)?;
    let page = state
        .version_service
        .list_history(&auth, workspace_id, &query.path, query.limit, query.offset)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/workspaces/{workspace_id}/history/restore
pub async fn restore_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<RestoreVersionRequest>,
) -> Result<Json<ApiResponse<RestoreOutcome>>, ApiError> {
    let body = validated(body)?;
    let outcome = state
        .version_service
        .restore_version(&auth, workspace_id, &body.path, body.version_id)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/workspaces/{workspace_id}/history/compare
pub async fn compare_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<VersionComparison>>, ApiError> {
    let query = validated(query)?;
    let comparison = state
        .version_service
        .compare_versions(&auth, workspace_id, &query.path, query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::ok(comparison)))
}
