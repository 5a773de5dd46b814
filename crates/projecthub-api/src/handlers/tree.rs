//! Tree listing handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use projecthub_entity::tree::{DirectoryChildren, TreeResult};

use crate::dto::ApiResponse;
use crate::dto::request::{ChildrenQuery, TreeQuery, validated};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/tree
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<ApiResponse<TreeResult>>, ApiError> {
    let query = validated(query)?;
    let tree = state
        .tree_service
        .get_tree(&auth, workspace_id, &query.path, &query.options())
        .await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/workspaces/{workspace_id}/tree/children
pub async fn get_children(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<ChildrenQuery>,
) -> Result<Json<ApiResponse<DirectoryChildren>>, ApiError> {
    let children = state
        .tree_service
        .get_directory_children(&auth, workspace_id, &query.path, query.include_system_files)
        .await?;
    Ok(Json(ApiResponse::ok(children)))
}
