//! Draft repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use projecthub_core::error::{AppError, ErrorKind};
use projecthub_core::result::AppResult;
use projecthub_entity::draft::Draft;

/// Repository for per-author drafts.
#[derive(Debug, Clone)]
pub struct DraftRepository {
    pool: PgPool,
}

impl DraftRepository {
    /// Create a new draft repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a draft or overwrite the existing one for the same key.
    pub async fn upsert(&self, draft: &Draft) -> AppResult<Draft> {
        sqlx::query_as::<_, Draft>(
            "INSERT INTO drafts (id, workspace_id, file_id, author_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (workspace_id, file_id, author_id) \
             DO UPDATE SET content = EXCLUDED.content, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(draft.id)
        .bind(draft.workspace_id)
        .bind(draft.file_id)
        .bind(draft.author_id)
        .bind(&draft.content)
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save draft", e))
    }

    /// Find a draft by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Draft>> {
        sqlx::query_as::<_, Draft>("SELECT * FROM drafts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find draft", e))
    }

    /// An author's drafts in a workspace, most recently updated first.
    pub async fn list_for_author(&self, workspace_id: Uuid, author_id: Uuid) -> AppResult<Vec<Draft>> {
        sqlx::query_as::<_, Draft>(
            "SELECT * FROM drafts WHERE workspace_id = $1 AND author_id = $2 \
             ORDER BY updated_at DESC",
        )
        .bind(workspace_id)
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list drafts", e))
    }

    /// Delete the draft for a key.
    pub async fn delete(&self, workspace_id: Uuid, file_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM drafts WHERE workspace_id = $1 AND file_id = $2 AND author_id = $3",
        )
        .bind(workspace_id)
        .bind(file_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete draft", e))?;
        Ok(result.rows_affected() > 0)
    }
}
