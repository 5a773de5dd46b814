//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable snapshot of a file's content.
///
/// Versions are append-only: they are never updated, and are only removed
/// by cascade when the owning file is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The owning workspace.
    pub workspace_id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// Content snapshot.
    pub content: String,
    /// Snapshot size in bytes.
    pub size_bytes: i64,
    /// User who created this version.
    pub author_id: Option<Uuid>,
    /// Optional message describing the change.
    pub message: Option<String>,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

impl FileVersion {
    /// Create a snapshot of `content` for a file.
    pub fn snapshot(
        workspace_id: Uuid,
        file_id: Uuid,
        content: String,
        author_id: Option<Uuid>,
        message: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            file_id,
            size_bytes: content.len() as i64,
            content,
            author_id,
            message,
            created_at: Utc::now(),
        }
    }
}
