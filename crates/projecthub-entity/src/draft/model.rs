//! Draft entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A per-user, per-file, unversioned scratch buffer.
///
/// At most one draft exists per `(workspace_id, file_id, author_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Draft {
    /// Unique draft identifier.
    pub id: Uuid,
    /// The owning workspace.
    pub workspace_id: Uuid,
    /// The file being drafted.
    pub file_id: Uuid,
    /// The draft's author.
    pub author_id: Uuid,
    /// Draft content.
    pub content: String,
    /// When the draft was first saved.
    pub created_at: DateTime<Utc>,
    /// When the draft was last overwritten.
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// Create a new draft.
    pub fn new(workspace_id: Uuid, file_id: Uuid, author_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            file_id,
            author_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the draft belongs to exactly this key.
    pub fn belongs_to(&self, workspace_id: Uuid, file_id: Uuid, author_id: Uuid) -> bool {
        self.workspace_id == workspace_id && self.file_id == file_id && self.author_id == author_id
    }
}
