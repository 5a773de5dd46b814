//! Individual WebSocket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::message::types::OutboundMessage;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single joined WebSocket connection.
///
/// Holds the sender for pushing messages to the client plus the identity
/// of the connected user. The socket task owns the matching receiver and
/// stops once [`ConnectionHandle::closed`] fires.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Workspace room this connection joined
    pub workspace_id: Uuid,
    /// User who owns this connection
    pub user_id: Uuid,
    /// Display name (cached for presence records)
    pub user_name: String,
    /// Email (cached for presence records)
    pub user_email: String,
    /// When the connection joined
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    pub(crate) fn new(
        workspace_id: Uuid,
        user_id: Uuid,
        user_name: String,
        user_email: String,
        sender: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            user_id,
            user_name,
            user_email,
            connected_at: Utc::now(),
            sender,
            shutdown: CancellationToken::new(),
        }
    }

    /// Queue a message without waiting. Returns `false` if it was dropped.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                false
            }
        }
    }

    /// Whether the hub or the client has ended this connection.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.sender.is_closed()
    }

    /// Ask the socket task to stop.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.shutdown.cancelled().await;
    }
}
