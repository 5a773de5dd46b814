//! Route definitions for the ProjectHub HTTP API.
//!
//! Workspace routes are mounted under `/api/workspaces/{workspace_id}`; the
//! presence socket lives at `/ws/workspaces/{workspace_id}`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.request_body_limit_bytes;
    let cors = build_cors_layer(&state.config.server);

    let workspace_routes = Router::new()
        .merge(tree_routes())
        .merge(content_routes())
        .merge(file_routes())
        .merge(history_routes())
        .merge(draft_routes())
        .route("/presence", get(handlers::presence::list_active_users));

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/workspaces/{workspace_id}", workspace_routes);

    let ws_routes = Router::new().route(
        "/ws/workspaces/{workspace_id}",
        get(handlers::ws::ws_upgrade),
    );

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Tree listings
fn tree_routes() -> Router<AppState> {
    Router::new()
        .route("/tree", get(handlers::tree::get_tree))
        .route("/tree/children", get(handlers::tree::get_children))
}

/// Content read and save
fn content_routes() -> Router<AppState> {
    Router::new().route(
        "/content",
        get(handlers::content::get_content).put(handlers::content::save_content),
    )
}

/// Structural mutations
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            post(handlers::file::create_file).delete(handlers::file::delete_file),
        )
        .route("/files/move", post(handlers::file::move_file))
        .route("/files/copy", post(handlers::file::copy_file))
        .route("/directories", post(handlers::file::create_directory))
}

/// History, restore, compare
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(handlers::history::list_history))
        .route("/history/restore", post(handlers::history::restore_version))
        .route("/history/compare", get(handlers::history::compare_versions))
}

/// Per-user drafts
fn draft_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/drafts",
            get(handlers::draft::list_drafts)
                .put(handlers::draft::save_draft)
                .delete(handlers::draft::discard_draft),
        )
        .route("/drafts/restore", post(handlers::draft::restore_draft))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    use projecthub_cache::CacheManager;
    use projecthub_core::config::AppConfig;
    use projecthub_database::MemoryRecordStore;

    use super::*;

    async fn router(config: AppConfig) -> Router {
        let store = Arc::new(MemoryRecordStore::new());
        let cache = Arc::new(CacheManager::new(&config.cache).await.unwrap());
        build_router(AppState::build(config, store.clone(), store, cache))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router(AppConfig::default())
            .await
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["cache"], true);
    }

    #[tokio::test]
    async fn test_unknown_workspace_is_not_found() {
        let uri = format!("/api/workspaces/{}/tree", Uuid::new_v4());
        let response = router(AppConfig::default())
            .await
            .oneshot(
                Request::get(uri)
                    .header("x-user-id", Uuid::new_v4().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit_applies() {
        let mut config = AppConfig::default();
        config.server.request_body_limit_bytes = 64;
        let uri = format!("/api/workspaces/{}/content", Uuid::new_v4());
        let body = serde_json::json!({ "path": "a.txt", "content": "x".repeat(256) });

        let response = router(config)
            .await
            .oneshot(
                Request::put(uri)
                    .header("x-user-id", Uuid::new_v4().to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
