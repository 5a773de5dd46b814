//! Version history service: append, list, restore, compare.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::events::{FileChangeEvent, FileChangeKind};
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_core::traits::ChangeNotifier;
use projecthub_database::store::RecordStore;
use projecthub_entity::file::{FileNode, FileVersion};

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::generation::GenerationCounter;

use super::diff::{LineDiff, diff_lines};

/// Message attached to the snapshot taken just before a restore.
pub const PRE_RESTORE_MESSAGE: &str = "pre-restore";

/// One page of a file's history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub versions: Vec<FileVersion>,
    pub total: i64,
    pub has_more: bool,
}

/// Result of restoring a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub file: FileNode,
    pub pre_restore_version: FileVersion,
    pub restored_version: FileVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
}

/// Result of comparing two versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparison {
    pub from_version_id: Uuid,
    pub to_version_id: Uuid,
    /// Counters under `changes` and the rendered text under `diff`.
    pub diff: LineDiff,
}

/// Manages file version history.
#[derive(Debug, Clone)]
pub struct VersionService {
    store: Arc<dyn RecordStore>,
    guard: AccessGuard,
    generations: GenerationCounter,
    notifier: Arc<dyn ChangeNotifier>,
    page_max: u64,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        store: Arc<dyn RecordStore>,
        guard: AccessGuard,
        generations: GenerationCounter,
        notifier: Arc<dyn ChangeNotifier>,
        page_max: u64,
    ) -> Self {
        Self {
            store,
            guard,
            generations,
            notifier,
            page_max,
        }
    }

    /// Append an immutable snapshot. Callers have already checked access.
    pub async fn append_version(
        &self,
        workspace_id: Uuid,
        file_id: Uuid,
        content: &str,
        author_id: Option<Uuid>,
        message: Option<String>,
    ) -> AppResult<FileVersion> {
        let version = FileVersion::snapshot(
            workspace_id,
            file_id,
            content.to_string(),
            author_id,
            message,
        );
        self.store.create_file_version(&version).await
    }

    /// A page of a file's history, newest first.
    pub async fn list_history(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<HistoryPage> {
        self.guard.require_read(ctx, workspace_id).await?;
        let file = self.resolve_file(workspace_id, file_path).await?;

        let limit = limit.clamp(1, self.page_max.max(1)) as i64;
        let offset = offset.min(i64::MAX as u64) as i64;
        let (versions, total) = self
            .store
            .list_file_versions(file.id, limit, offset)
            .await?;

        Ok(HistoryPage {
            versions,
            total,
            has_more: offset.saturating_add(limit) < total,
        })
    }

    /// Replace the file's content with an older version's.
    ///
    /// Records two new versions: the content just before the restore and
    /// the restored content. Existing versions are never touched.
    pub async fn restore_version(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        version_id: Uuid,
    ) -> AppResult<RestoreOutcome> {
        self.guard.require_read(ctx, workspace_id).await?;
        let mut file = self.resolve_file(workspace_id, file_path).await?;
        self.guard.require_node_write(ctx, workspace_id, &file).await?;

        let target = self
            .store
            .find_file_version(file.id, version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version not found: {version_id}")))?;

        let replaced = file.content_str().to_string();
        let expected_revision = file.revision;
        file.set_content(target.content.clone());
        let file = self.store.update_file_node(&file, expected_revision).await?;

        let pre_restore_version = self
            .append_version(
                workspace_id,
                file.id,
                &replaced,
                Some(ctx.user_id),
                Some(PRE_RESTORE_MESSAGE.to_string()),
            )
            .await?;

        let restored_version = self
            .append_version(
                workspace_id,
                file.id,
                &target.content,
                Some(ctx.user_id),
                Some(format!("Restored from version {version_id}")),
            )
            .await?;

        let generation = self.generations.bump(workspace_id).await;

        info!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            path = %file.path,
            version_id = %version_id,
            "File version restored"
        );

        self.notifier.notify_file_changed(
            workspace_id,
            FileChangeEvent::new(FileChangeKind::Restored, file.path.clone(), ctx.user_id)
                .with_generation(generation)
                .with_version(restored_version.id),
        );

        Ok(RestoreOutcome {
            file,
            pre_restore_version,
            restored_version,
            generation,
        })
    }

    /// Diff two versions of the same file.
    pub async fn compare_versions(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        from_version_id: Uuid,
        to_version_id: Uuid,
    ) -> AppResult<VersionComparison> {
        self.guard.require_read(ctx, workspace_id).await?;
        let file = self.resolve_file(workspace_id, file_path).await?;

        let from = self.find_version(file.id, from_version_id).await?;
        let to = self.find_version(file.id, to_version_id).await?;

        Ok(VersionComparison {
            from_version_id,
            to_version_id,
            diff: diff_lines(&from.content, &to.content),
        })
    }

    async fn find_version(&self, file_id: Uuid, version_id: Uuid) -> AppResult<FileVersion> {
        self.store
            .find_file_version(file_id, version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version not found: {version_id}")))
    }

    async fn resolve_file(&self, workspace_id: Uuid, file_path: &str) -> AppResult<FileNode> {
        let normalized = path::normalize_entry_path(file_path)?;
        let node = self
            .store
            .find_file_node(workspace_id, &normalized)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {normalized}")))?;
        if node.is_directory() {
            return Err(AppError::bad_request(format!(
                "Directories have no history: {normalized}"
            )));
        }
        Ok(node)
    }
}
