//! WebSocket upgrade handler for workspace presence.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use projecthub_realtime::{AuthorizedMember, ConnectionHandle, MemberIdentity, OutboundMessage};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /ws/workspaces/{workspace_id}
///
/// Membership is checked before the upgrade, so an unauthorized caller gets
/// a plain HTTP error and never joins the room.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let identity = MemberIdentity {
        user_id: auth.user_id,
        user_name: auth.user_name.clone(),
        user_email: auth.user_email.clone(),
    };
    let member = state.authorizer.authorize(identity, workspace_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, member, socket)))
}

/// Drives an established connection until either side goes away.
async fn handle_socket(state: AppState, member: AuthorizedMember, socket: WebSocket) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (handle, outbound_rx) = state.presence.join(member);
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = %handle.user_id,
        workspace_id = %handle.workspace_id,
        "WebSocket connection established"
    );

    let outbound_task = tokio::spawn(forward_outbound(handle.clone(), outbound_rx, ws_tx));

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    state.presence.handle_text(&handle, text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
        }
    }

    state.presence.leave(&handle);
    if let Err(e) = outbound_task.await {
        error!(conn_id = %conn_id, error = %e, "Outbound forwarder failed");
    }

    info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection closed");
}

/// Serializes queued messages onto the socket. Stops when the connection
/// handle is closed, which also covers eviction and server shutdown.
async fn forward_outbound(
    handle: Arc<ConnectionHandle>,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    mut ws_tx: SplitSink<WebSocket, Message>,
) {
    loop {
        let msg = tokio::select! {
            _ = handle.closed() => break,
            msg = outbound_rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!(conn_id = %handle.id, error = %e, "Failed to serialize outbound message");
                continue;
            }
        };
        if ws_tx.send(Message::Text(text.into())).await.is_err() {
            debug!(conn_id = %handle.id, "Socket gone, stopping forwarder");
            handle.close();
            return;
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: "connection closed".into(),
    }));
    let _ = ws_tx.send(close).await;
}
