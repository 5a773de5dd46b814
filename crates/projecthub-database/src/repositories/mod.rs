//! PostgreSQL repositories and the [`RecordStore`] facade over them.

pub mod access;
pub mod draft;
pub mod file_node;
pub mod version;
pub mod workspace;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use projecthub_core::result::AppResult;
use projecthub_entity::draft::Draft;
use projecthub_entity::file::{FileNode, FileVersion};
use projecthub_entity::workspace::Workspace;

use crate::store::{NodeQuery, RecordStore};

pub use access::PgAccessControl;
pub use draft::DraftRepository;
pub use file_node::FileNodeRepository;
pub use version::VersionRepository;
pub use workspace::WorkspaceRepository;

/// Record store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    workspaces: WorkspaceRepository,
    nodes: FileNodeRepository,
    versions: VersionRepository,
    drafts: DraftRepository,
}

impl PgRecordStore {
    /// Create a store over a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            workspaces: WorkspaceRepository::new(pool.clone()),
            nodes: FileNodeRepository::new(pool.clone()),
            versions: VersionRepository::new(pool.clone()),
            drafts: DraftRepository::new(pool),
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_workspace(&self, workspace_id: Uuid) -> AppResult<Option<Workspace>> {
        self.workspaces.find_by_id(workspace_id).await
    }

    async fn find_file_nodes(
        &self,
        workspace_id: Uuid,
        query: &NodeQuery,
    ) -> AppResult<Vec<FileNode>> {
        self.nodes.find_under(workspace_id, query).await
    }

    async fn find_file_node(&self, workspace_id: Uuid, path: &str) -> AppResult<Option<FileNode>> {
        self.nodes.find_by_path(workspace_id, path).await
    }

    async fn find_file_node_by_id(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
    ) -> AppResult<Option<FileNode>> {
        self.nodes.find_by_id(workspace_id, node_id).await
    }

    async fn has_descendants(&self, workspace_id: Uuid, dir_path: &str) -> AppResult<bool> {
        self.nodes.has_descendants(workspace_id, dir_path).await
    }

    async fn create_file_node(&self, node: &FileNode) -> AppResult<FileNode> {
        self.nodes.create(node).await
    }

    async fn insert_file_nodes(
        &self,
        nodes: &[FileNode],
        versions: &[FileVersion],
    ) -> AppResult<Vec<FileNode>> {
        self.nodes.create_batch(nodes, versions).await
    }

    async fn update_file_node(
        &self,
        node: &FileNode,
        expected_revision: i64,
    ) -> AppResult<FileNode> {
        self.nodes.update(node, expected_revision).await
    }

    async fn move_file_node(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
        new_path: &str,
    ) -> AppResult<FileNode> {
        self.nodes.move_subtree(workspace_id, node_id, new_path).await
    }

    async fn delete_file_node(&self, workspace_id: Uuid, node_id: Uuid) -> AppResult<bool> {
        self.nodes.delete(workspace_id, node_id).await
    }

    async fn create_file_version(&self, version: &FileVersion) -> AppResult<FileVersion> {
        self.versions.create(version).await
    }

    async fn find_file_version(
        &self,
        file_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<Option<FileVersion>> {
        self.versions.find_for_file(file_id, version_id).await
    }

    async fn list_file_versions(
        &self,
        file_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<FileVersion>, i64)> {
        self.versions.list_for_file(file_id, limit, offset).await
    }

    async fn upsert_draft(&self, draft: &Draft) -> AppResult<Draft> {
        self.drafts.upsert(draft).await
    }

    async fn find_draft(&self, draft_id: Uuid) -> AppResult<Option<Draft>> {
        self.drafts.find_by_id(draft_id).await
    }

    async fn list_drafts(&self, workspace_id: Uuid, author_id: Uuid) -> AppResult<Vec<Draft>> {
        self.drafts.list_for_author(workspace_id, author_id).await
    }

    async fn delete_draft(
        &self,
        workspace_id: Uuid,
        file_id: Uuid,
        author_id: Uuid,
    ) -> AppResult<bool> {
        self.drafts.delete(workspace_id, file_id, author_id).await
    }

    async fn get_generation(&self, workspace_id: Uuid) -> AppResult<i64> {
        self.workspaces.generation(workspace_id).await
    }

    async fn bump_generation(&self, workspace_id: Uuid) -> AppResult<i64> {
        self.workspaces.bump_generation(workspace_id).await
    }
}
