//! Membership-based access control over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use projecthub_core::error::{AppError, ErrorKind};
use projecthub_core::result::AppResult;

use crate::store::AccessControl;

/// Access control from the `workspaces` owner column and `workspace_members`.
#[derive(Debug, Clone)]
pub struct PgAccessControl {
    pool: PgPool,
}

impl PgAccessControl {
    /// Create a new access-control checker.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn check(&self, sql: &str, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(sql)
            .bind(workspace_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check access", e))
    }
}

#[async_trait]
impl AccessControl for PgAccessControl {
    async fn has_read_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.check(
            "SELECT EXISTS(SELECT 1 FROM workspaces WHERE id = $1 AND owner_id = $2) \
             OR EXISTS(SELECT 1 FROM workspace_members WHERE workspace_id = $1 AND user_id = $2)",
            workspace_id,
            user_id,
        )
        .await
    }

    async fn has_write_access(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.check(
            "SELECT EXISTS(SELECT 1 FROM workspaces WHERE id = $1 AND owner_id = $2) \
             OR EXISTS(SELECT 1 FROM workspace_members \
                       WHERE workspace_id = $1 AND user_id = $2 AND role = 'editor')",
            workspace_id,
            user_id,
        )
        .await
    }

    async fn is_owner(&self, workspace_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        self.check(
            "SELECT EXISTS(SELECT 1 FROM workspaces WHERE id = $1 AND owner_id = $2)",
            workspace_id,
            user_id,
        )
        .await
    }
}
