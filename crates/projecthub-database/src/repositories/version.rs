//! File version repository implementation.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use projecthub_core::error::{AppError, ErrorKind};
use projecthub_core::result::AppResult;
use projecthub_entity::file::FileVersion;

const VERSION_COLUMNS: &str =
    "id, workspace_id, file_id, content, size_bytes, author_id, message, created_at";

/// Repository for append-only file versions.
#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: PgPool,
}

impl VersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a version.
    pub async fn create(&self, version: &FileVersion) -> AppResult<FileVersion> {
        insert_version(&self.pool, version).await
    }

    /// Find a version that belongs to `file_id`.
    pub async fn find_for_file(&self, file_id: Uuid, version_id: Uuid) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM file_versions WHERE file_id = $1 AND id = $2"
        ))
        .bind(file_id)
        .bind(version_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    /// A page of versions, newest first, and the total count.
    pub async fn list_for_file(
        &self,
        file_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<FileVersion>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM file_versions WHERE file_id = $1")
                .bind(file_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count versions", e)
                })?;

        let versions = sqlx::query_as::<_, FileVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM file_versions WHERE file_id = $1 \
             ORDER BY created_at DESC, seq DESC LIMIT $2 OFFSET $3"
        ))
        .bind(file_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))?;

        Ok((versions, total))
    }
}

/// Insert one version row through any executor, pool or transaction.
pub(crate) async fn insert_version<'e, E>(executor: E, version: &FileVersion) -> AppResult<FileVersion>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, FileVersion>(&format!(
        "INSERT INTO file_versions (id, workspace_id, file_id, content, size_bytes, \
         author_id, message, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {VERSION_COLUMNS}"
    ))
    .bind(version.id)
    .bind(version.workspace_id)
    .bind(version.file_id)
    .bind(&version.content)
    .bind(version.size_bytes)
    .bind(version.author_id)
    .bind(&version.message)
    .bind(version.created_at)
    .fetch_one(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create version", e))
}
