//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use projecthub_api::AppState;
use projecthub_cache::CacheManager;
use projecthub_core::config::AppConfig;
use projecthub_database::MemoryRecordStore;
use projecthub_entity::workspace::MemberRole;

/// Content limit used by the test app, small enough to trip in a test.
pub const TEST_MAX_CONTENT_BYTES: u64 = 4 * 1024;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the presence hub directly
    pub state: AppState,
    /// Backing store
    pub store: Arc<MemoryRecordStore>,
    /// Workspace every test works in
    pub workspace_id: Uuid,
    /// Workspace owner
    pub owner: Uuid,
    /// Member with edit rights
    pub editor: Uuid,
    /// Read-only member
    pub viewer: Uuid,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.workspace.max_content_bytes = TEST_MAX_CONTENT_BYTES;

        let store = Arc::new(MemoryRecordStore::new());
        let owner = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let workspace = store.create_workspace("demo", owner).await;
        store.add_member(workspace.id, editor, MemberRole::Editor).await;
        store.add_member(workspace.id, viewer, MemberRole::Viewer).await;

        let cache = Arc::new(
            CacheManager::new(&config.cache)
                .await
                .expect("Failed to init cache"),
        );

        let state = AppState::build(config, store.clone(), store.clone(), cache);
        let router = projecthub_api::build_router(state.clone());

        Self {
            router,
            state,
            store,
            workspace_id: workspace.id,
            owner,
            editor,
            viewer,
        }
    }

    /// `/api/workspaces/{id}` followed by `suffix`
    pub fn url(&self, suffix: &str) -> String {
        format!("/api/workspaces/{}{}", self.workspace_id, suffix)
    }

    /// Make an HTTP request to the test app as `user`
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<Uuid>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, user, &[])
            .await
    }

    /// Like [`request`](Self::request) with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<Uuid>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req
                .header("x-user-id", user.to_string())
                .header("x-user-name", format!("user-{}", &user.to_string()[..8]));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Create a file through the API as the owner
    pub async fn create_file(&self, path: &str, content: &str) -> Value {
        let response = self
            .request(
                "POST",
                &self.url("/files"),
                Some(serde_json::json!({ "path": path, "content": content })),
                Some(self.owner),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Create a directory through the API as the owner
    pub async fn create_directory(&self, path: &str) {
        let response = self
            .request(
                "POST",
                &self.url("/directories"),
                Some(serde_json::json!({ "path": path })),
                Some(self.owner),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}
