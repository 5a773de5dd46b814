//! File content read and save handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_service::file::{ContentRead, SaveOutcome};

use crate::dto::ApiResponse;
use crate::dto::request::{ContentQuery, SaveContentRequest, validated};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workspaces/{workspace_id}/content
///
/// Honors `If-None-Match`: a matching ETag yields `304 Not Modified`.
pub async fn get_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<ContentQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let query = validated(query)?;
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());

    let read = state
        .file_service
        .get_content(&auth, workspace_id, &query.path, query.range(), if_none_match)
        .await?;

    let response = match read {
        ContentRead::NotModified { etag } => {
            (StatusCode::NOT_MODIFIED, [(header::ETAG, etag_header(&etag)?)]).into_response()
        }
        ContentRead::Content(content) => {
            let etag = etag_header(&content.etag)?;
            (
                StatusCode::OK,
                [(header::ETAG, etag)],
                Json(ApiResponse::ok(content)),
            )
                .into_response()
        }
    };
    Ok(response)
}

/// PUT /api/workspaces/{workspace_id}/content
pub async fn save_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<SaveContentRequest>,
) -> Result<Json<ApiResponse<SaveOutcome>>, ApiError> {
    let body = validated(body)?;
    let outcome = state
        .file_service
        .save_content(
            &auth,
            workspace_id,
            &body.path,
            body.content,
            body.last_modified,
            body.message,
        )
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

fn etag_header(etag: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(etag)
        .map_err(|e| ApiError(AppError::internal(format!("Invalid ETag header: {e}"))))
}
