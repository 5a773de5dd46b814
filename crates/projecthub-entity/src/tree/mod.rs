//! Tree listing output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::file::{FileNode, FilePermission, NodeKind};

/// One node of a tree listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub id: Uuid,
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub size: i64,
    pub mime_type: String,
    pub permissions: FilePermission,
    pub updated_at: DateTime<Utc>,
    /// Number of direct children present in this listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_count: Option<usize>,
    /// Lazy listings only: whether the directory has anything beneath it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    /// Build a childless item from a stored node.
    pub fn from_node(node: &FileNode) -> Self {
        Self {
            id: node.id,
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind,
            size: node.size_bytes,
            mime_type: node.mime_type.clone(),
            permissions: node.permissions,
            updated_at: node.updated_at,
            children_count: None,
            has_children: None,
            children: Vec::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Result of a tree query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResult {
    /// Root items, directories first, then by name.
    pub items: Vec<TreeItem>,
    /// Number of nodes after filtering, before nesting.
    pub total: usize,
    /// Normalized base path the listing was taken from.
    pub base_path: String,
    /// Workspace generation the listing reflects.
    pub generation: i64,
}

/// Immediate children of one directory, read without the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryChildren {
    pub path: String,
    pub items: Vec<TreeItem>,
    pub total: usize,
}
