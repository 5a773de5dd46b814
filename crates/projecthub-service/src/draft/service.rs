//! Draft service: save, list, restore, discard.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_database::store::RecordStore;
use projecthub_entity::draft::Draft;
use projecthub_entity::file::FileNode;

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::file::content::{FileContent, LineRange};

/// Manages drafts. Drafts are never versioned and never broadcast.
#[derive(Debug, Clone)]
pub struct DraftService {
    store: Arc<dyn RecordStore>,
    guard: AccessGuard,
    max_content_bytes: u64,
}

impl DraftService {
    /// Creates a new draft service.
    pub fn new(store: Arc<dyn RecordStore>, guard: AccessGuard, max_content_bytes: u64) -> Self {
        Self {
            store,
            guard,
            max_content_bytes,
        }
    }

    /// Insert or overwrite the caller's draft for a file.
    pub async fn save_draft(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        content: String,
    ) -> AppResult<Draft> {
        self.guard.require_write(ctx, workspace_id).await?;
        let file = self.resolve_file(workspace_id, file_path).await?;
        if content.len() as u64 > self.max_content_bytes {
            return Err(AppError::payload_too_large(format!(
                "Draft exceeds {} bytes",
                self.max_content_bytes
            )));
        }

        let draft = Draft::new(workspace_id, file.id, ctx.user_id, content);
        let saved = self.store.upsert_draft(&draft).await?;

        debug!(
            user_id = %ctx.user_id,
            workspace_id = %workspace_id,
            path = %file.path,
            "Draft saved"
        );
        Ok(saved)
    }

    /// The caller's drafts in a workspace, most recently updated first.
    pub async fn list_drafts(&self, ctx: &RequestContext, workspace_id: Uuid) -> AppResult<Vec<Draft>> {
        self.guard.require_read(ctx, workspace_id).await?;
        self.store.list_drafts(workspace_id, ctx.user_id).await
    }

    /// Return a draft's content shaped like a file read.
    ///
    /// Nothing is written: the caller must save explicitly to keep it.
    pub async fn restore_draft(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
        draft_id: Uuid,
    ) -> AppResult<FileContent> {
        self.guard.require_read(ctx, workspace_id).await?;
        let file = self.resolve_file(workspace_id, file_path).await?;

        let draft = self
            .store
            .find_draft(draft_id)
            .await?
            .filter(|d| d.belongs_to(workspace_id, file.id, ctx.user_id))
            .ok_or_else(|| AppError::not_found(format!("Draft not found: {draft_id}")))?;

        let mut content = FileContent::from_node(&file, &draft.content, LineRange::full())?;
        content.draft_id = Some(draft.id);
        Ok(content)
    }

    /// Explicitly discard the caller's draft for a file.
    pub async fn discard_draft(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        file_path: &str,
    ) -> AppResult<bool> {
        self.guard.require_read(ctx, workspace_id).await?;
        let file = self.resolve_file(workspace_id, file_path).await?;
        let removed = self
            .store
            .delete_draft(workspace_id, file.id, ctx.user_id)
            .await?;
        if removed {
            info!(user_id = %ctx.user_id, path = %file.path, "Draft discarded");
        }
        Ok(removed)
    }

    /// Drop the author's draft after a successful save. Failures are
    /// logged and swallowed.
    pub async fn discard_on_save(&self, workspace_id: Uuid, file_id: Uuid, author_id: Uuid) {
        if let Err(e) = self
            .store
            .delete_draft(workspace_id, file_id, author_id)
            .await
        {
            warn!(
                workspace_id = %workspace_id,
                file_id = %file_id,
                error = %e,
                "Failed to discard draft after save"
            );
        }
    }

    async fn resolve_file(&self, workspace_id: Uuid, file_path: &str) -> AppResult<FileNode> {
        let normalized = path::normalize_entry_path(file_path)?;
        self.store
            .find_file_node(workspace_id, &normalized)
            .await?
            .filter(FileNode::is_file)
            .ok_or_else(|| AppError::not_found(format!("File not found: {normalized}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::LineRange;
    use crate::testing::Fixture;
    use projecthub_core::error::ErrorKind;

    #[tokio::test]
    async fn test_drafts_are_per_author_and_overwritten() {
        let fx = Fixture::new().await;
        fx.files.create_file(&fx.owner, fx.ws, "a.txt", Some("saved".into())).await.unwrap();

        fx.drafts.save_draft(&fx.owner, fx.ws, "a.txt", "one".into()).await.unwrap();
        let second = fx.drafts.save_draft(&fx.owner, fx.ws, "a.txt", "two".into()).await.unwrap();
        fx.drafts.save_draft(&fx.editor, fx.ws, "a.txt", "theirs".into()).await.unwrap();

        let mine = fx.drafts.list_drafts(&fx.owner, fx.ws).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[0].content, "two");
    }

    #[tokio::test]
    async fn test_restore_draft_does_not_write() {
        let fx = Fixture::new().await;
        fx.files.create_file(&fx.owner, fx.ws, "a.txt", Some("saved".into())).await.unwrap();
        let draft = fx.drafts.save_draft(&fx.owner, fx.ws, "a.txt", "wip".into()).await.unwrap();

        let restored = fx
            .drafts
            .restore_draft(&fx.owner, fx.ws, "a.txt", draft.id)
            .await
            .unwrap();
        assert_eq!(restored.content, "wip");
        assert_eq!(restored.draft_id, Some(draft.id));

        let live = fx.read(&fx.owner, "a.txt", LineRange::full()).await;
        assert_eq!(live.content, "saved");
    }

    #[tokio::test]
    async fn test_restore_draft_of_other_author_is_not_found() {
        let fx = Fixture::new().await;
        fx.files.create_file(&fx.owner, fx.ws, "a.txt", None).await.unwrap();
        let draft = fx.drafts.save_draft(&fx.editor, fx.ws, "a.txt", "x".into()).await.unwrap();

        let err = fx
            .drafts
            .restore_draft(&fx.owner, fx.ws, "a.txt", draft.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_save_discards_only_the_savers_draft() {
        let fx = Fixture::new().await;
        fx.files.create_file(&fx.owner, fx.ws, "a.txt", None).await.unwrap();
        fx.drafts.save_draft(&fx.owner, fx.ws, "a.txt", "mine".into()).await.unwrap();
        fx.drafts.save_draft(&fx.editor, fx.ws, "a.txt", "theirs".into()).await.unwrap();

        fx.files
            .save_content(&fx.owner, fx.ws, "a.txt", "final".into(), None, None)
            .await
            .unwrap();

        assert!(fx.drafts.list_drafts(&fx.owner, fx.ws).await.unwrap().is_empty());
        assert_eq!(fx.drafts.list_drafts(&fx.editor, fx.ws).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_discard_is_idempotent() {
        let fx = Fixture::new().await;
        fx.files.create_file(&fx.owner, fx.ws, "a.txt", None).await.unwrap();
        fx.drafts.save_draft(&fx.owner, fx.ws, "a.txt", "x".into()).await.unwrap();
        assert!(fx.drafts.discard_draft(&fx.owner, fx.ws, "a.txt").await.unwrap());
        assert!(!fx.drafts.discard_draft(&fx.owner, fx.ws, "a.txt").await.unwrap());
    }
}
