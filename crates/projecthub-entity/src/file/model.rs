//! File node entity model.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use projecthub_core::path;

use super::kind::{FilePermission, NodeKind};
use super::mime::{DIRECTORY_MIME, mime_type_for};

/// One file or directory in a workspace, identified by its path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FileNode {
    /// Unique node identifier.
    pub id: Uuid,
    /// The owning workspace.
    pub workspace_id: Uuid,
    /// Normalized path, unique within the workspace.
    pub path: String,
    /// Last path segment.
    pub name: String,
    /// File or directory.
    pub kind: NodeKind,
    /// Content; `None` for directories.
    pub content: Option<String>,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// MIME type derived from the extension.
    pub mime_type: String,
    /// Write permission.
    pub permissions: FilePermission,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
    /// When the node was last modified. Strictly increases on every write.
    pub updated_at: DateTime<Utc>,
    /// Write counter, starting at 1.
    pub revision: i64,
}

/// Current time at the microsecond precision the database keeps.
pub fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl FileNode {
    /// Create a new file node. `path` must already be normalized.
    pub fn new_file(workspace_id: Uuid, path: &str, content: String) -> Self {
        let now = stored_now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            path: path.to_string(),
            name: path::file_name(path).to_string(),
            kind: NodeKind::File,
            size_bytes: content.len() as i64,
            content: Some(content),
            mime_type: mime_type_for(path).to_string(),
            permissions: FilePermission::ReadWrite,
            created_at: now,
            updated_at: now,
            revision: 1,
        }
    }

    /// Create a new directory node. `path` must already be normalized.
    pub fn new_directory(workspace_id: Uuid, path: &str) -> Self {
        let now = stored_now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            path: path.to_string(),
            name: path::file_name(path).to_string(),
            kind: NodeKind::Directory,
            content: None,
            size_bytes: 0,
            mime_type: DIRECTORY_MIME.to_string(),
            permissions: FilePermission::ReadWrite,
            created_at: now,
            updated_at: now,
            revision: 1,
        }
    }

    /// Check whether this node is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Check whether this node is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Check whether only the workspace owner may modify this node.
    pub fn is_read_only(&self) -> bool {
        self.permissions == FilePermission::ReadOnly
    }

    /// Content as a string slice; empty for directories.
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Replace the content, updating size and modification time.
    pub fn set_content(&mut self, content: String) {
        self.size_bytes = content.len() as i64;
        self.content = Some(content);
        self.touch();
    }

    /// Advance the revision and stamp a modification time later than the
    /// previous one, even within the same microsecond.
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = stored_now().max(self.updated_at + TimeDelta::microseconds(1));
    }

    /// Point the node at a new path, re-deriving name and MIME type.
    pub fn relocate(&mut self, new_path: &str) {
        self.path = new_path.to_string();
        self.name = path::file_name(new_path).to_string();
        if self.is_file() {
            self.mime_type = mime_type_for(new_path).to_string();
        }
        self.touch();
    }

    /// A copy of this node at `new_path` with a fresh identity.
    pub fn duplicate_at(&self, new_path: &str) -> Self {
        let now = stored_now();
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.path = new_path.to_string();
        copy.name = path::file_name(new_path).to_string();
        if copy.is_file() {
            copy.mime_type = mime_type_for(new_path).to_string();
        }
        copy.created_at = now;
        copy.updated_at = now;
        copy.revision = 1;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_derives_metadata() {
        let node = FileNode::new_file(Uuid::nil(), "src/lib.rs", "fn main() {}".into());
        assert_eq!(node.name, "lib.rs");
        assert_eq!(node.size_bytes, 12);
        assert_eq!(node.mime_type, "text/x-rust");
        assert!(node.is_file());
    }

    #[test]
    fn test_relocate_updates_name_and_mime() {
        let mut node = FileNode::new_file(Uuid::nil(), "notes.txt", String::new());
        node.relocate("docs/notes.md");
        assert_eq!(node.name, "notes.md");
        assert_eq!(node.mime_type, "text/markdown");
    }

    #[test]
    fn test_back_to_back_writes_are_distinguishable() {
        let mut node = FileNode::new_file(Uuid::nil(), "a.txt", "a".into());
        let first = (node.revision, node.updated_at);
        node.set_content("b".into());
        let second = (node.revision, node.updated_at);
        node.set_content("c".into());

        assert_eq!(second.0, first.0 + 1);
        assert!(second.1 > first.1);
        assert!(node.updated_at > second.1);
        assert_eq!(node.updated_at, node.updated_at.trunc_subsecs(6));
    }

    #[test]
    fn test_directory_has_no_content() {
        let dir = FileNode::new_directory(Uuid::nil(), "dir");
        assert!(dir.content.is_none());
        assert_eq!(dir.content_str(), "");
        assert_eq!(dir.mime_type, DIRECTORY_MIME);
    }
}
