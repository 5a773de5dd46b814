//! Integration tests for the presence WebSocket.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn ws_url(addr: SocketAddr, workspace_id: Uuid, user: Uuid, name: &str) -> String {
    format!("ws://{addr}/ws/workspaces/{workspace_id}?user_id={user}&user_name={name}")
}

async fn connect(app: &helpers::TestApp, addr: SocketAddr, user: Uuid, name: &str) -> Socket {
    let (socket, _) = tokio_tungstenite::connect_async(ws_url(addr, app.workspace_id, user, name))
        .await
        .expect("WebSocket handshake failed");
    socket
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Socket closed")
            .expect("Socket error");
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

async fn next_of_type(socket: &mut Socket, kind: &str) -> Value {
    loop {
        let value = next_json(socket).await;
        if value["type"] == kind {
            return value;
        }
    }
}

async fn send(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

#[tokio::test]
async fn test_join_open_and_leave() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let mut owner = connect(&app, addr, app.owner, "ann").await;
    let snapshot = next_of_type(&mut owner, "active_users").await;
    assert!(snapshot["users"].as_array().unwrap().is_empty());

    let mut editor = connect(&app, addr, app.editor, "bob").await;
    next_of_type(&mut editor, "active_users").await;
    let joined = next_of_type(&mut owner, "user_joined").await;
    assert_eq!(joined["user"]["user_name"], "bob");

    send(&mut owner, json!({ "type": "file_opened", "path": "/notes.md" })).await;
    let update = next_of_type(&mut editor, "presence_update").await;
    assert_eq!(update["user"]["user_id"], app.owner.to_string());
    assert_eq!(update["user"]["file_path"], "notes.md");

    let response = app
        .request("GET", &app.url("/presence"), None, Some(app.viewer))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let users = response.body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["user_name"], "ann");

    editor.close(None).await.expect("Close failed");
    let left = next_of_type(&mut owner, "user_left").await;
    assert_eq!(left["user_id"], app.editor.to_string());
}

#[tokio::test]
async fn test_durable_changes_reach_the_room() {
    let app = helpers::TestApp::new().await;
    app.create_file("a.txt", "hello").await;
    let addr = app.spawn().await;

    let mut viewer = connect(&app, addr, app.viewer, "vic").await;
    next_of_type(&mut viewer, "active_users").await;

    let response = app
        .request(
            "PUT",
            &app.url("/content"),
            Some(json!({ "path": "a.txt", "content": "changed" })),
            Some(app.editor),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let changed = next_of_type(&mut viewer, "file_changed").await;
    assert_eq!(changed["event"]["kind"], "saved");
    assert_eq!(changed["event"]["path"], "a.txt");
    assert_eq!(changed["event"]["actor_id"], app.editor.to_string());
}

#[tokio::test]
async fn test_content_changed_relayed_to_others_only() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let mut owner = connect(&app, addr, app.owner, "ann").await;
    next_of_type(&mut owner, "active_users").await;
    let mut editor = connect(&app, addr, app.editor, "bob").await;
    next_of_type(&mut editor, "active_users").await;
    next_of_type(&mut owner, "user_joined").await;

    send(
        &mut editor,
        json!({ "type": "content_changed", "path": "a.txt", "summary": "typing" }),
    )
    .await;
    let modified = next_of_type(&mut owner, "file_modified").await;
    assert_eq!(modified["user_name"], "bob");
    assert_eq!(modified["summary"], "typing");

    send(&mut editor, json!({ "type": "subscribe" })).await;
    let error = next_of_type(&mut editor, "error").await;
    assert_eq!(error["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_non_member_cannot_join() {
    let app = helpers::TestApp::new().await;
    let addr = app.spawn().await;

    let result =
        tokio_tungstenite::connect_async(ws_url(addr, app.workspace_id, Uuid::new_v4(), "eve"))
            .await;

    assert!(result.is_err());
    assert_eq!(app.state.presence.connection_count(), 0);
}
