//! Presence snapshot handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use projecthub_entity::presence::PresenceRecord;
use projecthub_realtime::MemberIdentity;

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/presence
///
/// Lists users with a fresh presence record in the workspace room.
pub async fn list_active_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PresenceRecord>>>, ApiError> {
    let identity = MemberIdentity {
        user_id: auth.user_id,
        user_name: auth.user_name.clone(),
        user_email: auth.user_email.clone(),
    };
    state.authorizer.authorize(identity, workspace_id).await?;

    Ok(Json(ApiResponse::ok(
        state.presence.active_users(workspace_id),
    )))
}
