//! File service: content reads and saves, create, delete, move, copy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::events::{FileChangeEvent, FileChangeKind};
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_core::traits::ChangeNotifier;
use projecthub_database::store::{NodeQuery, RecordStore};
use projecthub_entity::file::{FileNode, FileVersion};

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::draft::DraftService;
use crate::generation::GenerationCounter;
use crate::version::VersionService;

use super::content::{ContentRead, FileContent, LineRange, etag_matches};

/// Message attached to the first version of a new file.
pub const INITIAL_VERSION_MESSAGE: &str = "Initial version";

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub file: FileNode,
    /// `None` when the content was unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<FileVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}

/// Orchestrates content and structural changes to file nodes.
#[derive(Debug, Clone)]
pub struct FileService {
    store: Arc<dyn RecordStore>,
    guard: AccessGuard,
    generations: GenerationCounter,
    versions: VersionService,
    drafts: DraftService,
    notifier: Arc<dyn ChangeNotifier>,
    max_content_bytes: u64,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        store: Arc<dyn RecordStore>,
        guard: AccessGuard,
        generations: GenerationCounter,
        versions: VersionService,
        drafts: DraftService,
        notifier: Arc<dyn ChangeNotifier>,
        max_content_bytes: u64,
    ) -> Self {
        Self {
            store,
            guard,
            generations,
            versions,
            drafts,
            notifier,
            max_content_bytes,
        }
    }

    // ── Content ────────────────────────────────────────────

    /// Read a line window of a file.
    ///
    /// When `if_none_match` equals the window's ETag the content is not
    /// returned.
    pub async fn get_content(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        range: LineRange,
        if_none_match: Option<&str>,
    ) -> AppResult<ContentRead> {
        self.guard.require_read(ctx, workspace_id).await?;
        let file = self.require_file(workspace_id, file_path).await?;
        let content = FileContent::from_node(&file, file.content_str(), range)?;

        if if_none_match.is_some_and(|tag| etag_matches(tag, &content.etag)) {
            return Ok(ContentRead::NotModified { etag: content.etag });
        }
        Ok(ContentRead::Content(content))
    }

    /// Replace a file's content.
    ///
    /// With `last_modified` set, the save fails with `Conflict` unless it
    /// equals the file's current modification time exactly. The write
    /// itself is conditional on the revision that was read, so a concurrent
    /// save between the check and the write also fails with `Conflict`.
    /// Saving identical content records nothing but still clears the
    /// caller's draft.
    pub async fn save_content(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        content: String,
        last_modified: Option<DateTime<Utc>>,
        message: Option<String>,
    ) -> AppResult<SaveOutcome> {
        self.guard.require_read(ctx, workspace_id).await?;
        let mut file = self.require_file(workspace_id, file_path).await?;
        self.guard.require_node_write(ctx, workspace_id, &file).await?;
        self.check_size(&content)?;

        if let Some(seen) = last_modified {
            if seen != file.updated_at {
                return Err(AppError::conflict(format!(
                    "File was modified since it was read: {}",
                    file.path
                )));
            }
        }

        if file.content_str() == content {
            self.drafts
                .discard_on_save(workspace_id, file.id, ctx.user_id)
                .await;
            return Ok(SaveOutcome {
                file,
                version: None,
                generation: None,
            });
        }

        let expected_revision = file.revision;
        file.set_content(content);
        let file = self.store.update_file_node(&file, expected_revision).await?;
        let version = self
            .versions
            .append_version(
                workspace_id,
                file.id,
                file.content_str(),
                Some(ctx.user_id),
                message,
            )
            .await?;
        let generation = self.generations.bump(workspace_id).await;
        self.drafts
            .discard_on_save(workspace_id, file.id, ctx.user_id)
            .await;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            path = %file.path,
            size = file.size_bytes,
            "File content saved"
        );

        self.notifier.notify_file_changed(
            workspace_id,
            FileChangeEvent::new(FileChangeKind::Saved, file.path.clone(), ctx.user_id)
                .with_generation(generation)
                .with_version(version.id),
        );

        Ok(SaveOutcome {
            file,
            version: Some(version),
            generation,
        })
    }

    // ── Structure ──────────────────────────────────────────

    /// Create a file with an initial version.
    pub async fn create_file(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        content: Option<String>,
    ) -> AppResult<FileNode> {
        self.guard.require_write(ctx, workspace_id).await?;
        let target = path::normalize_entry_path(file_path)?;
        let content = content.unwrap_or_default();
        self.check_size(&content)?;
        self.require_vacant(workspace_id, &target).await?;
        self.require_parent_dir(workspace_id, &target).await?;

        let node = FileNode::new_file(workspace_id, &target, content);
        let initial = FileVersion::snapshot(
            workspace_id,
            node.id,
            node.content_str().to_string(),
            Some(ctx.user_id),
            Some(INITIAL_VERSION_MESSAGE.to_string()),
        );
        let node = self
            .store
            .insert_file_nodes(&[node], &[initial])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Insert returned no node"))?;
        let generation = self.generations.bump(workspace_id).await;

        info!(user_id = %ctx.user_id, workspace_id = %workspace_id, path = %node.path, "File created");
        self.notify(workspace_id, ctx, FileChangeKind::Created, &node, None, generation);
        Ok(node)
    }

    /// Create an empty directory.
    pub async fn create_directory(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        dir_path: &str,
    ) -> AppResult<FileNode> {
        self.guard.require_write(ctx, workspace_id).await?;
        let target = path::normalize_entry_path(dir_path)?;
        self.require_vacant(workspace_id, &target).await?;
        self.require_parent_dir(workspace_id, &target).await?;

        let node = self
            .store
            .create_file_node(&FileNode::new_directory(workspace_id, &target))
            .await?;
        let generation = self.generations.bump(workspace_id).await;

        info!(user_id = %ctx.user_id, workspace_id = %workspace_id, path = %node.path, "Directory created");
        self.notify(workspace_id, ctx, FileChangeKind::Created, &node, None, generation);
        Ok(node)
    }

    /// Delete a file, or a directory that has nothing beneath it.
    pub async fn delete_file(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        node_path: &str,
    ) -> AppResult<()> {
        self.guard.require_read(ctx, workspace_id).await?;
        let node = self.require_node(workspace_id, node_path).await?;
        self.guard.require_node_write(ctx, workspace_id, &node).await?;

        if node.is_directory() && self.store.has_descendants(workspace_id, &node.path).await? {
            return Err(AppError::bad_request(format!(
                "Directory is not empty: {}",
                node.path
            )));
        }

        if !self.store.delete_file_node(workspace_id, node.id).await? {
            return Err(AppError::not_found(format!("File not found: {}", node.path)));
        }
        let generation = self.generations.bump(workspace_id).await;

        info!(user_id = %ctx.user_id, workspace_id = %workspace_id, path = %node.path, "File deleted");
        self.notify(workspace_id, ctx, FileChangeKind::Deleted, &node, None, generation);
        Ok(())
    }

    /// Move or rename a node. Directories carry their subtree along.
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        from_path: &str,
        to_path: &str,
    ) -> AppResult<FileNode> {
        self.guard.require_read(ctx, workspace_id).await?;
        let node = self.require_node(workspace_id, from_path).await?;
        self.guard.require_node_write(ctx, workspace_id, &node).await?;
        let target = self.check_destination(workspace_id, &node, to_path).await?;

        let moved = self
            .store
            .move_file_node(workspace_id, node.id, &target)
            .await?;
        let generation = self.generations.bump(workspace_id).await;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            from = %node.path,
            to = %moved.path,
            "File moved"
        );
        self.notify(
            workspace_id,
            ctx,
            FileChangeKind::Moved,
            &moved,
            Some(&node.path),
            generation,
        );
        Ok(moved)
    }

    /// Copy a file, or a directory with everything beneath it. Every copied
    /// file starts its own history.
    pub async fn copy_file(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        from_path: &str,
        to_path: &str,
    ) -> AppResult<FileNode> {
        self.guard.require_write(ctx, workspace_id).await?;
        let source = self.require_node(workspace_id, from_path).await?;
        let target = self.check_destination(workspace_id, &source, to_path).await?;

        let subtree = if source.is_directory() {
            self.store
                .find_file_nodes(workspace_id, &NodeQuery::under(source.path.clone(), None))
                .await?
        } else {
            vec![source.clone()]
        };

        // Ordered by path, so every parent precedes its children.
        let mut copies = Vec::with_capacity(subtree.len());
        let mut initial_versions = Vec::new();
        for original in &subtree {
            let Some(copy_path) = path::rebase(&original.path, &source.path, &target) else {
                continue;
            };
            let copy = original.duplicate_at(&copy_path);
            if copy.is_file() {
                initial_versions.push(FileVersion::snapshot(
                    workspace_id,
                    copy.id,
                    copy.content_str().to_string(),
                    Some(ctx.user_id),
                    Some(format!("Copied from {}", original.path)),
                ));
            }
            copies.push(copy);
        }

        let created = self
            .store
            .insert_file_nodes(&copies, &initial_versions)
            .await?;
        let root_copy = created.into_iter().find(|n| n.path == target);
        let copy = root_copy.ok_or_else(|| AppError::internal("Copy produced no root node"))?;
        let generation = self.generations.bump(workspace_id).await;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            from = %source.path,
            to = %copy.path,
            nodes = copies.len(),
            "File copied"
        );
        self.notify(
            workspace_id,
            ctx,
            FileChangeKind::Copied,
            &copy,
            Some(&source.path),
            generation,
        );
        Ok(copy)
    }

    // ── Helpers ────────────────────────────────────────────

    fn check_size(&self, content: &str) -> AppResult<()> {
        if content.len() as u64 > self.max_content_bytes {
            return Err(AppError::payload_too_large(format!(
                "Content exceeds {} bytes",
                self.max_content_bytes
            )));
        }
        Ok(())
    }

    async fn require_node(&self, workspace_id: Uuid, node_path: &str) -> AppResult<FileNode> {
        let normalized = path::normalize_entry_path(node_path)?;
        self.store
            .find_file_node(workspace_id, &normalized)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {normalized}")))
    }

    async fn require_file(&self, workspace_id: Uuid, file_path: &str) -> AppResult<FileNode> {
        let node = self.require_node(workspace_id, file_path).await?;
        if node.is_directory() {
            return Err(AppError::bad_request(format!(
                "Path is a directory: {}",
                node.path
            )));
        }
        Ok(node)
    }

    async fn require_vacant(&self, workspace_id: Uuid, target: &str) -> AppResult<()> {
        if self.store.find_file_node(workspace_id, target).await?.is_some() {
            return Err(AppError::conflict(format!("Path already exists: {target}")));
        }
        Ok(())
    }

    async fn require_parent_dir(&self, workspace_id: Uuid, target: &str) -> AppResult<()> {
        let parent = path::parent_of(target);
        if parent.is_empty() {
            return Ok(());
        }
        match self.store.find_file_node(workspace_id, parent).await? {
            Some(node) if node.is_directory() => Ok(()),
            Some(_) => Err(AppError::bad_request(format!(
                "Parent is not a directory: {parent}"
            ))),
            None => Err(AppError::bad_request(format!(
                "Parent directory does not exist: {parent}"
            ))),
        }
    }

    /// Validate a move or copy destination and return it normalized.
    async fn check_destination(
        &self,
        workspace_id: Uuid,
        source: &FileNode,
        to_path: &str,
    ) -> AppResult<String> {
        let target = path::normalize_entry_path(to_path)?;
        if target == source.path {
            return Err(AppError::bad_request(
                "Source and destination are the same path",
            ));
        }
        if source.is_directory() && path::is_descendant(&target, &source.path) {
            return Err(AppError::bad_request(format!(
                "Cannot place directory {} inside itself",
                source.path
            )));
        }
        self.require_vacant(workspace_id, &target).await?;
        self.require_parent_dir(workspace_id, &target).await?;
        Ok(target)
    }

    fn notify(
        &self,
        workspace_id: Uuid,
        ctx: &RequestContext,
        kind: FileChangeKind,
        node: &FileNode,
        previous_path: Option<&str>,
        generation: Option<i64>,
    ) {
        let mut event = FileChangeEvent::new(kind, node.path.clone(), ctx.user_id)
            .directory(node.is_directory())
            .with_generation(generation);
        if let Some(previous) = previous_path {
            event = event.with_previous_path(previous);
        }
        self.notifier.notify_file_changed(workspace_id, event);
    }
}
