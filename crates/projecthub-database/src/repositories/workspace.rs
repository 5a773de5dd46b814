//! Workspace repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use projecthub_core::error::{AppError, ErrorKind};
use projecthub_core::result::AppResult;
use projecthub_entity::workspace::Workspace;

/// Repository for workspace rows and the generation counter.
#[derive(Debug, Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    /// Create a new workspace repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a workspace by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Workspace>> {
        sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find workspace", e))
    }

    /// Read the current generation.
    pub async fn generation(&self, id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT generation FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read generation", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Workspace {id} not found")))
    }

    /// Increment the generation in a single statement.
    pub async fn bump_generation(&self, id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE workspaces SET generation = generation + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING generation",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump generation", e))?
        .ok_or_else(|| AppError::not_found(format!("Workspace {id} not found")))
    }
}
