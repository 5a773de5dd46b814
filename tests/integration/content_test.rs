//! Integration tests for content reads, saves, and structural mutations.

mod helpers;

use http::StatusCode;
use serde_json::json;

const NOTES: &str = "line1\nline2\nline3\n";

#[tokio::test]
async fn test_read_and_save_round_trip() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let read = app
        .request("GET", &app.url("/content?path=notes.md"), None, Some(app.editor))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    let data = &read.body["data"];
    assert_eq!(data["content"], NOTES);
    assert_eq!(data["totalLines"], 3);
    assert_eq!(data["hasMore"], false);
    assert_eq!(data["mimeType"], "text/markdown");

    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({
                "path": "notes.md",
                "content": "line1\nchanged\nline3\n",
                "lastModified": data["updatedAt"],
                "message": "edit line two",
            })),
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["version"]["message"], "edit line two");

    let reread = app
        .request("GET", &app.url("/content?path=notes.md"), None, Some(app.viewer))
        .await;
    assert_eq!(reread.body["data"]["content"], "line1\nchanged\nline3\n");
}

#[tokio::test]
async fn test_line_window() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let response = app
        .request(
            "GET",
            &app.url("/content?path=notes.md&startLine=2&endLine=2"),
            None,
            Some(app.owner),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["content"], "line2\n");
    assert_eq!(data["startLine"], 2);
    assert_eq!(data["endLine"], 2);
    assert_eq!(data["hasMore"], true);

    let response = app
        .request(
            "GET",
            &app.url("/content?path=notes.md&startLine=9"),
            None,
            Some(app.owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_if_none_match_returns_304() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let first = app
        .request("GET", &app.url("/content?path=notes.md"), None, Some(app.owner))
        .await;
    let etag = first
        .headers
        .get(http::header::ETAG)
        .expect("ETag header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(first.body["data"]["etag"], etag.as_str());

    let second = app
        .request_with_headers(
            "GET",
            &app.url("/content?path=notes.md"),
            None,
            Some(app.owner),
            &[("if-none-match", etag.as_str())],
        )
        .await;
    assert_eq!(second.status, StatusCode::NOT_MODIFIED);
    assert_eq!(second.headers.get(http::header::ETAG).unwrap(), etag.as_str());
    assert!(second.body.is_null());
}

#[tokio::test]
async fn test_stale_save_conflicts() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({
                "path": "notes.md",
                "content": "mine",
                "lastModified": "2000-01-01T00:00:00Z",
            })),
            Some(app.editor),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_back_to_back_saves_detect_stale_timestamp() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let read = app
        .request("GET", &app.url("/content?path=notes.md"), None, Some(app.owner))
        .await;
    let seen = read.body["data"]["updatedAt"].clone();
    let etag = read.body["data"]["etag"].as_str().unwrap().to_string();

    let first = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": "notes.md", "content": "BBBB", "lastModified": seen })),
            Some(app.editor),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);

    let second = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": "notes.md", "content": "AAAA", "lastModified": seen })),
            Some(app.owner),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let reread = app
        .request_with_headers(
            "GET",
            &app.url("/content?path=notes.md"),
            None,
            Some(app.owner),
            &[("if-none-match", etag.as_str())],
        )
        .await;
    assert_eq!(reread.status, StatusCode::OK);
    assert_eq!(reread.body["data"]["content"], "BBBB");
}

#[tokio::test]
async fn test_oversized_save_is_rejected() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let big = "x".repeat(helpers::TEST_MAX_CONTENT_BYTES as usize + 1);
    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": "notes.md", "content": big })),
            Some(app.editor),
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["error"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_viewer_cannot_save() {
    let app = helpers::TestApp::new().await;
    app.create_file("notes.md", NOTES).await;

    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": "notes.md", "content": "nope" })),
            Some(app.viewer),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", &app.url("/content?path=ghost.txt"), None, Some(app.owner))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rules() {
    let app = helpers::TestApp::new().await;
    app.create_file("a.txt", "hello").await;

    let duplicate = app
        .request(
            "POST",
            &app.url("/files"),
            Some(json!({ "path": "a.txt" })),
            Some(app.owner),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let orphan = app
        .request(
            "POST",
            &app.url("/files"),
            Some(json!({ "path": "missing/b.txt" })),
            Some(app.owner),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);

    let traversal = app
        .request(
            "POST",
            &app.url("/files"),
            Some(json!({ "path": "../etc/passwd" })),
            Some(app.owner),
        )
        .await;
    assert_eq!(traversal.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_move_and_copy() {
    let app = helpers::TestApp::new().await;
    app.create_directory("src").await;
    app.create_file("src/main.rs", "fn main() {}\n").await;
    app.create_directory("lib").await;

    let moved = app
        .request(
            "POST",
            &app.url("/files/move"),
            Some(json!({ "from": "src", "to": "lib/src" })),
            Some(app.editor),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{:?}", moved.body);
    assert_eq!(moved.body["data"]["path"], "lib/src");

    let read = app
        .request(
            "GET",
            &app.url("/content?path=lib/src/main.rs"),
            None,
            Some(app.editor),
        )
        .await;
    assert_eq!(read.body["data"]["content"], "fn main() {}\n");

    let copied = app
        .request(
            "POST",
            &app.url("/files/copy"),
            Some(json!({ "from": "lib/src/main.rs", "to": "main.rs" })),
            Some(app.editor),
        )
        .await;
    assert_eq!(copied.status, StatusCode::CREATED);

    let into_self = app
        .request(
            "POST",
            &app.url("/files/move"),
            Some(json!({ "from": "lib", "to": "lib/src/lib" })),
            Some(app.editor),
        )
        .await;
    assert_eq!(into_self.status, StatusCode::BAD_REQUEST);
}
