//! Seam traits over durable workspace state.
//!
//! The service layer only ever talks to [`RecordStore`] and
//! [`AccessControl`]; it never sees which backend sits behind them.

use async_trait::async_trait;
use uuid::Uuid;

use projecthub_core::result::AppResult;
use projecthub_entity::draft::Draft;
use projecthub_entity::file::{FileNode, FileVersion};
use projecthub_entity::workspace::Workspace;

/// Which file nodes to fetch for a tree listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeQuery {
    /// Normalized base path. Matches the path itself and everything beneath
    /// it; empty means the whole workspace.
    pub path_prefix: String,
    /// Maximum depth in segments below the prefix. `None` is unlimited.
    pub max_depth: Option<usize>,
}

impl NodeQuery {
    /// Query everything under `path_prefix`, at most `max_depth` levels down.
    pub fn under(path_prefix: impl Into<String>, max_depth: Option<usize>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            max_depth,
        }
    }

    /// Whether a node at `path` satisfies this query.
    pub fn matches(&self, path: &str) -> bool {
        match projecthub_core::path::relative_depth(path, &self.path_prefix) {
            Some(depth) => self.max_depth.is_none_or(|max| depth <= max),
            None => false,
        }
    }
}

/// Durable CRUD over workspaces, file nodes, versions, and drafts.
///
/// Implementations must make `bump_generation` a single atomic increment.
/// Errors use [`projecthub_core::error::ErrorKind::Conflict`] for a
/// duplicate `(workspace_id, path)` and
/// [`projecthub_core::error::ErrorKind::Database`] for everything else.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    // ── Workspaces ──

    /// Find a workspace by ID.
    async fn find_workspace(&self, workspace_id: Uuid) -> AppResult<Option<Workspace>>;

    // ── File nodes ──

    /// Fetch nodes matching `query`, ordered by path.
    async fn find_file_nodes(&self, workspace_id: Uuid, query: &NodeQuery)
    -> AppResult<Vec<FileNode>>;

    /// Find a node by its normalized path.
    async fn find_file_node(&self, workspace_id: Uuid, path: &str) -> AppResult<Option<FileNode>>;

    /// Find a node by ID.
    async fn find_file_node_by_id(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
    ) -> AppResult<Option<FileNode>>;

    /// Whether anything exists strictly beneath `dir_path`.
    async fn has_descendants(&self, workspace_id: Uuid, dir_path: &str) -> AppResult<bool>;

    /// Insert a node.
    async fn create_file_node(&self, node: &FileNode) -> AppResult<FileNode>;

    /// Insert nodes together with their initial versions, all or nothing.
    /// Nodes must be ordered so every parent precedes its children.
    async fn insert_file_nodes(
        &self,
        nodes: &[FileNode],
        versions: &[FileVersion],
    ) -> AppResult<Vec<FileNode>>;

    /// Persist a node's content, size, permissions, revision, and
    /// timestamps, provided the stored revision is still
    /// `expected_revision`. Fails with `Conflict` when another write got
    /// there first.
    async fn update_file_node(
        &self,
        node: &FileNode,
        expected_revision: i64,
    ) -> AppResult<FileNode>;

    /// Move a node to `new_path`, rewriting every descendant path in the
    /// same transaction. Returns the moved node.
    async fn move_file_node(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
        new_path: &str,
    ) -> AppResult<FileNode>;

    /// Delete a node together with its versions and drafts.
    async fn delete_file_node(&self, workspace_id: Uuid, node_id: Uuid) -> AppResult<bool>;

    // ── Versions ──

    /// Append a version.
    async fn create_file_version(&self, version: &FileVersion) -> AppResult<FileVersion>;

    /// Find a version that belongs to `file_id`.
    async fn find_file_version(
        &self,
        file_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<Option<FileVersion>>;

    /// A page of versions, newest first, plus the total count.
    async fn list_file_versions(
        &self,
        file_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<FileVersion>, i64)>;

    // ── Drafts ──

    /// Insert or overwrite the draft for its `(workspace, file, author)` key.
    async fn upsert_draft(&self, draft: &Draft) -> AppResult<Draft>;

    /// Find a draft by ID.
    async fn find_draft(&self, draft_id: Uuid) -> AppResult<Option<Draft>>;

    /// All drafts of an author in a workspace, most recently updated first.
    async fn list_drafts(&self, workspace_id: Uuid, author_id: Uuid) -> AppResult<Vec<Draft>>;

    /// Delete the draft for a key. Returns whether one existed.
    async fn delete_draft(
        &self,
        workspace_id: Uuid,
        file_id: Uuid,
        author_id: Uuid,
    ) -> AppResult<bool>;

    // ── Generation ──

    /// Current generation of a workspace.
    async fn get_generation(&self, workspace_id: Uuid) -> AppResult<i64>;

    /// Atomically increment a workspace's generation and return the new value.
    async fn bump_generation(&self, workspace_id: Uuid) -> AppResult<i64>;
}

/// Answers membership questions for a workspace.
#[async_trait]
pub trait AccessControl: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the user may list and read the workspace.
    async fn has_read_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Whether the user may modify the workspace.
    async fn has_write_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool>;

    /// Whether the user owns the workspace.
    async fn is_owner(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}
