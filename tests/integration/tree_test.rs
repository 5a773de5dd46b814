//! Integration tests for tree listings and cache invalidation.

mod helpers;

use http::StatusCode;
use serde_json::Value;

async fn seeded() -> helpers::TestApp {
    let app = helpers::TestApp::new().await;
    app.create_file("a.txt", "hello").await;
    app.create_directory("dir").await;
    app.create_file("dir/b.txt", "world").await;
    app
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_tree_nests_directories_first() {
    let app = seeded().await;

    let response = app.request("GET", &app.url("/tree"), None, Some(app.viewer)).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["basePath"], "");
    assert_eq!(names(&data["items"]), vec!["dir", "a.txt"]);

    let dir = &data["items"][0];
    assert_eq!(dir["type"], "DIRECTORY");
    assert_eq!(dir["childrenCount"], 1);
    assert_eq!(names(&dir["children"]), vec!["b.txt"]);
}

#[tokio::test]
async fn test_delete_invalidates_cached_tree() {
    let app = seeded().await;

    let before = app.request("GET", &app.url("/tree"), None, Some(app.owner)).await;
    let generation_before = before.body["data"]["generation"].as_i64().unwrap();

    let response = app
        .request(
            "DELETE",
            &app.url("/files?path=dir/b.txt"),
            None,
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["removed"], true);

    let after = app.request("GET", &app.url("/tree"), None, Some(app.owner)).await;
    let data = &after.body["data"];
    assert!(data["generation"].as_i64().unwrap() > generation_before);
    assert_eq!(data["total"], 2);
    assert_eq!(data["items"][0]["childrenCount"], 0);
}

#[tokio::test]
async fn test_lazy_tree_and_children() {
    let app = seeded().await;

    let response = app
        .request("GET", &app.url("/tree?lazy=true"), None, Some(app.owner))
        .await;
    let dir = &response.body["data"]["items"][0];
    assert_eq!(dir["hasChildren"], true);
    assert!(dir.get("children").is_none());

    let response = app
        .request("GET", &app.url("/tree/children?path=dir"), None, Some(app.owner))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["path"], "dir");
    assert_eq!(names(&response.body["data"]["items"]), vec!["b.txt"]);
}

#[tokio::test]
async fn test_system_files_hidden_unless_requested() {
    let app = seeded().await;
    app.create_directory("node_modules").await;

    let hidden = app.request("GET", &app.url("/tree"), None, Some(app.owner)).await;
    assert_eq!(names(&hidden.body["data"]["items"]), vec!["dir", "a.txt"]);

    let shown = app
        .request(
            "GET",
            &app.url("/tree?includeSystemFiles=true"),
            None,
            Some(app.owner),
        )
        .await;
    assert_eq!(
        names(&shown.body["data"]["items"]),
        vec!["dir", "node_modules", "a.txt"]
    );
}

#[tokio::test]
async fn test_search_promotes_matches_without_parents() {
    let app = seeded().await;

    let response = app
        .request("GET", &app.url("/tree?search=B.TXT"), None, Some(app.owner))
        .await;

    let data = &response.body["data"];
    assert_eq!(data["total"], 1);
    assert_eq!(names(&data["items"]), vec!["b.txt"]);
    assert_eq!(data["items"][0]["path"], "dir/b.txt");
}

#[tokio::test]
async fn test_tree_rejects_strangers_and_missing_identity() {
    let app = seeded().await;

    let response = app
        .request("GET", &app.url("/tree"), None, Some(uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");

    let response = app.request("GET", &app.url("/tree"), None, None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["ws_connections"], 0);
}
