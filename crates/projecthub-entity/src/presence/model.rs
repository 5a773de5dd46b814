//! Presence record model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A zero-based selection span inside an open file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// Line where the selection starts.
    pub start_line: u32,
    /// Column where the selection starts.
    pub start_column: u32,
    /// Line where the selection ends.
    pub end_line: u32,
    /// Column where the selection ends.
    pub end_column: u32,
}

/// A cursor location with an optional selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// Cursor line.
    pub line: u32,
    /// Cursor column.
    pub column: u32,
    /// Active selection, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionRange>,
}

/// Live activity of one user in one workspace.
///
/// Owned by the presence hub; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// The user.
    pub user_id: Uuid,
    /// Display name.
    pub user_name: String,
    /// Email address.
    pub user_email: String,
    /// Currently open file; empty when none.
    pub file_path: String,
    /// Cursor in the open file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
    /// Last time this user did anything.
    pub last_seen: DateTime<Utc>,
}

impl PresenceRecord {
    /// Create a record for a user who has just joined.
    pub fn new(user_id: Uuid, user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            user_email: user_email.into(),
            file_path: String::new(),
            cursor: None,
            last_seen: Utc::now(),
        }
    }

    /// Record that the user opened `path`.
    pub fn open_file(&mut self, path: impl Into<String>, now: DateTime<Utc>) {
        self.file_path = path.into();
        self.cursor = None;
        self.last_seen = now;
    }

    /// Record a cursor move, optionally switching files.
    pub fn move_cursor(&mut self, path: Option<String>, cursor: CursorPosition, now: DateTime<Utc>) {
        if let Some(path) = path {
            self.file_path = path;
        }
        self.cursor = Some(cursor);
        self.last_seen = now;
    }

    /// Clear the open file if it is `path`. Returns whether anything changed.
    pub fn close_file(&mut self, path: &str, now: DateTime<Utc>) -> bool {
        self.last_seen = now;
        if self.file_path != path {
            return false;
        }
        self.file_path.clear();
        self.cursor = None;
        true
    }

    /// Refresh `last_seen`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }

    /// Whether the record should appear in active-user listings at `now`.
    pub fn is_active(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.file_path.is_empty() && now - self.last_seen <= ttl
    }
}
