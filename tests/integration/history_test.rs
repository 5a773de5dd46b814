//! Integration tests for version history and drafts.

mod helpers;

use http::StatusCode;
use serde_json::{Value, json};

async fn save(app: &helpers::TestApp, path: &str, content: &str) -> Value {
    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": path, "content": content })),
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["data"].clone()
}

async fn history(app: &helpers::TestApp, path: &str) -> Value {
    let response = app
        .request(
            "GET",
            &app.url(&format!("/history?path={path}")),
            None,
            Some(app.viewer),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["data"].clone()
}

#[tokio::test]
async fn test_restore_appends_two_entries() {
    let app = helpers::TestApp::new().await;
    app.create_file("doc.txt", "one\n").await;
    save(&app, "doc.txt", "two\n").await;

    let page = history(&app, "doc.txt").await;
    assert_eq!(page["total"], 2);
    let initial = page["versions"][1].clone();
    assert_eq!(initial["message"], "Initial version");

    let response = app
        .request(
            "POST",
            &app.url("/history/restore"),
            Some(json!({ "path": "doc.txt", "versionId": initial["id"] })),
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["file"]["content"], "one\n");
    assert_eq!(response.body["data"]["preRestoreVersion"]["content"], "two\n");

    let page = history(&app, "doc.txt").await;
    assert_eq!(page["total"], 4);
    assert_eq!(page["versions"][1]["message"], "pre-restore");
    assert_eq!(
        page["versions"][0]["message"],
        format!("Restored from version {}", initial["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_history_pages() {
    let app = helpers::TestApp::new().await;
    app.create_file("doc.txt", "0\n").await;
    for i in 1..=4 {
        save(&app, "doc.txt", &format!("{i}\n")).await;
    }

    let response = app
        .request(
            "GET",
            &app.url("/history?path=doc.txt&limit=2&offset=1"),
            None,
            Some(app.owner),
        )
        .await;

    let page = &response.body["data"];
    assert_eq!(page["total"], 5);
    assert_eq!(page["hasMore"], true);
    assert_eq!(page["versions"].as_array().unwrap().len(), 2);
    assert_eq!(page["versions"][0]["content"], "3\n");
}

#[tokio::test]
async fn test_compare_versions() {
    let app = helpers::TestApp::new().await;
    app.create_file("doc.txt", "a\nb\nc\n").await;
    save(&app, "doc.txt", "a\nB\nc\nd\n").await;

    let page = history(&app, "doc.txt").await;
    let newest = page["versions"][0]["id"].as_str().unwrap().to_string();
    let oldest = page["versions"][1]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "GET",
            &app.url(&format!(
                "/history/compare?path=doc.txt&from={oldest}&to={newest}"
            )),
            None,
            Some(app.viewer),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let diff = &response.body["data"]["diff"];
    assert!(diff["diff"].as_str().unwrap().contains("+ B"));
    let changes = &diff["changes"];
    assert_eq!(changes["added"], 2);
    assert_eq!(changes["removed"], 1);
    assert_eq!(changes["modified"], 1);
}

#[tokio::test]
async fn test_unknown_version_is_not_found() {
    let app = helpers::TestApp::new().await;
    app.create_file("doc.txt", "one\n").await;

    let response = app
        .request(
            "POST",
            &app.url("/history/restore"),
            Some(json!({ "path": "doc.txt", "versionId": uuid::Uuid::new_v4() })),
            Some(app.editor),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_draft_lifecycle() {
    let app = helpers::TestApp::new().await;
    app.create_file("doc.txt", "one\n").await;

    let response = app
        .request(
            "PUT",
            &app.url("/drafts"),
            Some(json!({ "path": "doc.txt", "content": "scratch\n" })),
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let draft_id = response.body["data"]["id"].clone();

    let listed = app
        .request("GET", &app.url("/drafts"), None, Some(app.editor))
        .await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);

    let others = app
        .request("GET", &app.url("/drafts"), None, Some(app.owner))
        .await;
    assert!(others.body["data"].as_array().unwrap().is_empty());

    let restored = app
        .request(
            "POST",
            &app.url("/drafts/restore"),
            Some(json!({ "path": "doc.txt", "draftId": draft_id })),
            Some(app.editor),
        )
        .await;
    assert_eq!(restored.status, StatusCode::OK);
    assert_eq!(restored.body["data"]["content"], "scratch\n");
    assert_eq!(restored.body["data"]["draftId"], draft_id);

    save(&app, "doc.txt", "final\n").await;

    let listed = app
        .request("GET", &app.url("/drafts"), None, Some(app.editor))
        .await;
    assert!(listed.body["data"].as_array().unwrap().is_empty());

    let discarded = app
        .request("DELETE", &app.url("/drafts?path=doc.txt"), None, Some(app.editor))
        .await;
    assert_eq!(discarded.status, StatusCode::OK);
    assert_eq!(discarded.body["data"]["removed"], false);
}
