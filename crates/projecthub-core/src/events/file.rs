//! File change events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a file or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    /// A file or directory was created.
    Created,
    /// A file or directory was deleted.
    Deleted,
    /// A file or directory was moved or renamed.
    Moved,
    /// A file or directory was copied.
    Copied,
    /// A file's content was replaced by an older version.
    Restored,
    /// A file's content was saved.
    Saved,
}

impl FileChangeKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Deleted => "deleted",
            Self::Moved => "moved",
            Self::Copied => "copied",
            Self::Restored => "restored",
            Self::Saved => "saved",
        }
    }
}

impl std::fmt::Display for FileChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A durable change to the workspace tree or to a file's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChangeEvent {
    /// What happened.
    pub kind: FileChangeKind,
    /// The affected path (the destination for moves and copies).
    pub path: String,
    /// The source path for moves and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    /// Whether the affected entry is a directory.
    pub is_directory: bool,
    /// The user who caused the change.
    pub actor_id: Uuid,
    /// The workspace generation after the change, when the bump succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    /// The version recorded by the change (saves and restores).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<Uuid>,
    /// When the change became durable.
    pub timestamp: DateTime<Utc>,
}

impl FileChangeEvent {
    /// Create an event for `path` caused by `actor_id`.
    pub fn new(kind: FileChangeKind, path: impl Into<String>, actor_id: Uuid) -> Self {
        Self {
            kind,
            path: path.into(),
            previous_path: None,
            is_directory: false,
            actor_id,
            generation: None,
            version_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the source path.
    pub fn with_previous_path(mut self, previous_path: impl Into<String>) -> Self {
        self.previous_path = Some(previous_path.into());
        self
    }

    /// Mark the entry as a directory.
    pub fn directory(mut self, is_directory: bool) -> Self {
        self.is_directory = is_directory;
        self
    }

    /// Record the generation reached by the change.
    pub fn with_generation(mut self, generation: Option<i64>) -> Self {
        self.generation = generation;
        self
    }

    /// Record the version created by the change.
    pub fn with_version(mut self, version_id: Uuid) -> Self {
        self.version_id = Some(version_id);
        self
    }
}
