//! In-process record store and access control.
//!
//! Backs the `memory` store provider and every test that needs a store.
//! All state lives behind one `tokio::sync::RwLock`; no lock is held
//! across an await point other than the lock acquisition itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_entity::draft::Draft;
use projecthub_entity::file::{FileNode, FileVersion};
use projecthub_entity::workspace::{MemberRole, Workspace};

use crate::store::{AccessControl, NodeQuery, RecordStore};

#[derive(Debug, Default)]
struct MemoryState {
    workspaces: HashMap<Uuid, Workspace>,
    members: HashMap<(Uuid, Uuid), MemberRole>,
    nodes: HashMap<Uuid, FileNode>,
    paths: HashMap<(Uuid, String), Uuid>,
    /// Append order doubles as the tie-breaker for equal timestamps.
    versions: Vec<FileVersion>,
    drafts: HashMap<Uuid, Draft>,
}

impl MemoryState {
    fn node_by_path(&self, workspace_id: Uuid, node_path: &str) -> Option<&FileNode> {
        self.paths
            .get(&(workspace_id, node_path.to_string()))
            .and_then(|id| self.nodes.get(id))
    }

    fn subtree_ids(&self, workspace_id: Uuid, base: &str) -> Vec<Uuid> {
        self.nodes
            .values()
            .filter(|n| n.workspace_id == workspace_id && path::is_within(&n.path, base))
            .map(|n| n.id)
            .collect()
    }
}

/// Record store and access control kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: RwLock<MemoryState>,
    node_queries: AtomicUsize,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workspace owned by `owner_id`.
    pub async fn create_workspace(&self, name: &str, owner_id: Uuid) -> Workspace {
        let workspace = Workspace::new(name, owner_id);
        self.state
            .write()
            .await
            .workspaces
            .insert(workspace.id, workspace.clone());
        workspace
    }

    /// Grant `user_id` a role in a workspace.
    pub async fn add_member(&self, workspace_id: Uuid, user_id: Uuid, role: MemberRole) {
        self.state
            .write()
            .await
            .members
            .insert((workspace_id, user_id), role);
    }

    /// Number of `find_file_nodes` calls served so far.
    pub fn node_query_count(&self) -> usize {
        self.node_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_workspace(&self, workspace_id: Uuid) -> AppResult<Option<Workspace>> {
        Ok(self.state.read().await.workspaces.get(&workspace_id).cloned())
    }

    async fn find_file_nodes(
        &self,
        workspace_id: Uuid,
        query: &NodeQuery,
    ) -> AppResult<Vec<FileNode>> {
        self.node_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        let mut nodes: Vec<FileNode> = state
            .nodes
            .values()
            .filter(|n| n.workspace_id == workspace_id && query.matches(&n.path))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(nodes)
    }

    async fn find_file_node(&self, workspace_id: Uuid, path: &str) -> AppResult<Option<FileNode>> {
        Ok(self
            .state
            .read()
            .await
            .node_by_path(workspace_id, path)
            .cloned())
    }

    async fn find_file_node_by_id(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
    ) -> AppResult<Option<FileNode>> {
        Ok(self
            .state
            .read()
            .await
            .nodes
            .get(&node_id)
            .filter(|n| n.workspace_id == workspace_id)
            .cloned())
    }

    async fn has_descendants(&self, workspace_id: Uuid, dir_path: &str) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .nodes
            .values()
            .any(|n| n.workspace_id == workspace_id && path::is_descendant(&n.path, dir_path)))
    }

    async fn create_file_node(&self, node: &FileNode) -> AppResult<FileNode> {
        let mut state = self.state.write().await;
        if !state.workspaces.contains_key(&node.workspace_id) {
            return Err(AppError::not_found(format!(
                "Workspace {} not found",
                node.workspace_id
            )));
        }
        let key = (node.workspace_id, node.path.clone());
        if state.paths.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Path already exists: {}",
                node.path
            )));
        }
        state.paths.insert(key, node.id);
        state.nodes.insert(node.id, node.clone());
        Ok(node.clone())
    }

    async fn insert_file_nodes(
        &self,
        nodes: &[FileNode],
        versions: &[FileVersion],
    ) -> AppResult<Vec<FileNode>> {
        let mut state = self.state.write().await;
        for node in nodes {
            if !state.workspaces.contains_key(&node.workspace_id) {
                return Err(AppError::not_found(format!(
                    "Workspace {} not found",
                    node.workspace_id
                )));
            }
            let duplicate_in_batch = nodes
                .iter()
                .filter(|n| n.workspace_id == node.workspace_id && n.path == node.path)
                .count()
                > 1;
            if duplicate_in_batch || state.node_by_path(node.workspace_id, &node.path).is_some() {
                return Err(AppError::conflict(format!(
                    "Path already exists: {}",
                    node.path
                )));
            }
        }
        for version in versions {
            if !nodes.iter().any(|n| n.id == version.file_id) {
                return Err(AppError::not_found(format!(
                    "File node {} not found",
                    version.file_id
                )));
            }
        }

        for node in nodes {
            state
                .paths
                .insert((node.workspace_id, node.path.clone()), node.id);
            state.nodes.insert(node.id, node.clone());
        }
        state.versions.extend(versions.iter().cloned());
        Ok(nodes.to_vec())
    }

    async fn update_file_node(
        &self,
        node: &FileNode,
        expected_revision: i64,
    ) -> AppResult<FileNode> {
        let mut state = self.state.write().await;
        let stored = state
            .nodes
            .get_mut(&node.id)
            .filter(|n| n.workspace_id == node.workspace_id)
            .ok_or_else(|| AppError::not_found(format!("File not found: {}", node.path)))?;
        if stored.revision != expected_revision {
            return Err(AppError::conflict(format!(
                "File was modified concurrently: {}",
                node.path
            )));
        }
        stored.content = node.content.clone();
        stored.size_bytes = node.size_bytes;
        stored.mime_type = node.mime_type.clone();
        stored.permissions = node.permissions;
        stored.updated_at = node.updated_at;
        stored.revision = node.revision;
        Ok(stored.clone())
    }

    async fn move_file_node(
        &self,
        workspace_id: Uuid,
        node_id: Uuid,
        new_path: &str,
    ) -> AppResult<FileNode> {
        let mut state = self.state.write().await;
        let old_path = state
            .nodes
            .get(&node_id)
            .filter(|n| n.workspace_id == workspace_id)
            .map(|n| n.path.clone())
            .ok_or_else(|| AppError::not_found(format!("File node {node_id} not found")))?;

        let ids = state.subtree_ids(workspace_id, &old_path);
        let mut renames = Vec::with_capacity(ids.len());
        for id in ids {
            let current = &state.nodes[&id].path;
            let Some(target) = path::rebase(current, &old_path, new_path) else {
                continue;
            };
            let taken = state
                .paths
                .get(&(workspace_id, target.clone()))
                .is_some_and(|owner| owner != &id && !path::is_within(&state.nodes[owner].path, &old_path));
            if taken {
                return Err(AppError::conflict(format!("Path already exists: {target}")));
            }
            renames.push((id, current.clone(), target));
        }

        for (_, from, _) in &renames {
            state.paths.remove(&(workspace_id, from.clone()));
        }
        for (id, _, target) in renames {
            state.paths.insert((workspace_id, target.clone()), id);
            if let Some(node) = state.nodes.get_mut(&id) {
                if id == node_id {
                    node.relocate(&target);
                } else {
                    node.path = target;
                    node.touch();
                }
            }
        }

        state
            .nodes
            .get(&node_id)
            .cloned()
            .ok_or_else(|| AppError::internal("Moved node vanished"))
    }

    async fn delete_file_node(&self, workspace_id: Uuid, node_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(node) = state
            .nodes
            .get(&node_id)
            .filter(|n| n.workspace_id == workspace_id)
            .cloned()
        else {
            return Ok(false);
        };
        state.nodes.remove(&node_id);
        state.paths.remove(&(workspace_id, node.path));
        state.versions.retain(|v| v.file_id != node_id);
        state.drafts.retain(|_, d| d.file_id != node_id);
        Ok(true)
    }

    async fn create_file_version(&self, version: &FileVersion) -> AppResult<FileVersion> {
        let mut state = self.state.write().await;
        if !state.nodes.contains_key(&version.file_id) {
            return Err(AppError::not_found(format!(
                "File node {} not found",
                version.file_id
            )));
        }
        state.versions.push(version.clone());
        Ok(version.clone())
    }

    async fn find_file_version(
        &self,
        file_id: Uuid,
        version_id: Uuid,
    ) -> AppResult<Option<FileVersion>> {
        Ok(self
            .state
            .read()
            .await
            .versions
            .iter()
            .find(|v| v.file_id == file_id && v.id == version_id)
            .cloned())
    }

    async fn list_file_versions(
        &self,
        file_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<FileVersion>, i64)> {
        let state = self.state.read().await;
        let mut all: Vec<(usize, &FileVersion)> = state
            .versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.file_id == file_id)
            .collect();
        all.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(_, v)| v.clone())
            .collect();
        Ok((page, total))
    }

    async fn upsert_draft(&self, draft: &Draft) -> AppResult<Draft> {
        let mut state = self.state.write().await;
        let existing = state
            .drafts
            .values_mut()
            .find(|d| d.belongs_to(draft.workspace_id, draft.file_id, draft.author_id));
        if let Some(existing) = existing {
            existing.content = draft.content.clone();
            existing.updated_at = draft.updated_at;
            return Ok(existing.clone());
        }
        state.drafts.insert(draft.id, draft.clone());
        Ok(draft.clone())
    }

    async fn find_draft(&self, draft_id: Uuid) -> AppResult<Option<Draft>> {
        Ok(self.state.read().await.drafts.get(&draft_id).cloned())
    }

    async fn list_drafts(&self, workspace_id: Uuid, author_id: Uuid) -> AppResult<Vec<Draft>> {
        let state = self.state.read().await;
        let mut drafts: Vec<Draft> = state
            .drafts
            .values()
            .filter(|d| d.workspace_id == workspace_id && d.author_id == author_id)
            .cloned()
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    async fn delete_draft(
        &self,
        workspace_id: Uuid,
        file_id: Uuid,
        author_id: Uuid,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.drafts.len();
        state
            .drafts
            .retain(|_, d| !d.belongs_to(workspace_id, file_id, author_id));
        Ok(state.drafts.len() < before)
    }

    async fn get_generation(&self, workspace_id: Uuid) -> AppResult<i64> {
        self.state
            .read()
            .await
            .workspaces
            .get(&workspace_id)
            .map(|w| w.generation)
            .ok_or_else(|| AppError::not_found(format!("Workspace {workspace_id} not found")))
    }

    async fn bump_generation(&self, workspace_id: Uuid) -> AppResult<i64> {
        let mut state = self.state.write().await;
        let workspace = state
            .workspaces
            .get_mut(&workspace_id)
            .ok_or_else(|| AppError::not_found(format!("Workspace {workspace_id} not found")))?;
        workspace.generation += 1;
        workspace.updated_at = Utc::now();
        Ok(workspace.generation)
    }
}

#[async_trait]
impl AccessControl for MemoryRecordStore {
    async fn has_read_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let state = self.state.read().await;
        let owner = state
            .workspaces
            .get(&workspace_id)
            .is_some_and(|w| w.is_owned_by(user_id));
        Ok(owner || state.members.contains_key(&(workspace_id, user_id)))
    }

    async fn has_write_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let state = self.state.read().await;
        let owner = state
            .workspaces
            .get(&workspace_id)
            .is_some_and(|w| w.is_owned_by(user_id));
        let editor = state
            .members
            .get(&(workspace_id, user_id))
            .is_some_and(|role| role.can_write());
        Ok(owner || editor)
    }

    async fn is_owner(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .workspaces
            .get(&workspace_id)
            .is_some_and(|w| w.is_owned_by(user_id)))
    }
}
