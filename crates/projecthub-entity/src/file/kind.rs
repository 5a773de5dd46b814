//! File node kind and permission enums.

use serde::{Deserialize, Serialize};

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "node_kind", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// A regular file with content.
    File,
    /// A directory; never carries content.
    Directory,
}

impl NodeKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Write permission attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_permission", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilePermission {
    /// Members with write access may modify the node.
    ReadWrite,
    /// Only the workspace owner may modify the node.
    ReadOnly,
}

impl Default for FilePermission {
    fn default() -> Self {
        Self::ReadWrite
    }
}
