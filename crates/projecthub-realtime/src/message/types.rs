//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use projecthub_core::events::FileChangeEvent;
use projecthub_entity::presence::{CursorPosition, PresenceRecord};

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// The user focused a file.
    FileOpened {
        /// File path.
        path: String,
    },
    /// The user closed a file.
    FileClosed {
        /// File path.
        path: String,
    },
    /// The cursor moved, optionally in a different file.
    CursorMoved {
        /// File path, when it changed along with the cursor.
        #[serde(default)]
        path: Option<String>,
        /// New cursor position.
        cursor: CursorPosition,
    },
    /// The user edited a file's buffer.
    ContentChanged {
        /// File path.
        path: String,
        /// Short description of the edit.
        #[serde(default)]
        summary: Option<String>,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A user opened their first connection to the room.
    UserJoined {
        /// The new user's presence.
        user: PresenceRecord,
    },
    /// A user's last connection left the room.
    UserLeft {
        /// User ID.
        user_id: Uuid,
        /// Display name.
        user_name: String,
    },
    /// Everyone currently active in the room.
    ActiveUsers {
        /// Active presence records.
        users: Vec<PresenceRecord>,
    },
    /// A user's open file or cursor changed.
    PresenceUpdate {
        /// Updated presence.
        user: PresenceRecord,
    },
    /// Another user is editing a file.
    FileModified {
        /// File path.
        path: String,
        /// Editing user.
        user_id: Uuid,
        /// Display name.
        user_name: String,
        /// Short description of the edit.
        #[serde(skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },
    /// A durable change to the workspace.
    FileChanged {
        /// The change.
        event: FileChangeEvent,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}
