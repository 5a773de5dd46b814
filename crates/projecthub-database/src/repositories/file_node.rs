//! File node repository implementation.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use projecthub_core::error::{AppError, ErrorKind};
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_entity::file::{FileNode, FileVersion};

use crate::store::NodeQuery;

use super::version::insert_version;

const NODE_COLUMNS: &str = "id, workspace_id, path, name, kind, content, size_bytes, mime_type, \
                            permissions, created_at, updated_at, revision";

/// Repository for file and directory rows.
#[derive(Debug, Clone)]
pub struct FileNodeRepository {
    pool: PgPool,
}

impl FileNodeRepository {
    /// Create a new file node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch nodes at or beneath `query.path_prefix`, ordered by path.
    pub async fn find_under(&self, workspace_id: Uuid, query: &NodeQuery) -> AppResult<Vec<FileNode>> {
        let prefix = &query.path_prefix;
        let base_depth = path::depth(prefix) as i32;
        let max_depth = query.max_depth.map(|d| base_depth + d as i32);

        sqlx::query_as::<_, FileNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM file_nodes \
             WHERE workspace_id = $1 \
               AND ($2 = '' OR path = $2 OR path LIKE $3 ESCAPE '\\') \
               AND ($4::INT IS NULL OR depth <= $4) \
             ORDER BY path ASC"
        ))
        .bind(workspace_id)
        .bind(prefix)
        .bind(descendant_pattern(prefix))
        .bind(max_depth)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file nodes", e))
    }

    /// Find a node by path.
    pub async fn find_by_path(&self, workspace_id: Uuid, node_path: &str) -> AppResult<Option<FileNode>> {
        sqlx::query_as::<_, FileNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM file_nodes WHERE workspace_id = $1 AND path = $2"
        ))
        .bind(workspace_id)
        .bind(node_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file node", e))
    }

    /// Find a node by ID.
    pub async fn find_by_id(&self, workspace_id: Uuid, id: Uuid) -> AppResult<Option<FileNode>> {
        sqlx::query_as::<_, FileNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM file_nodes WHERE workspace_id = $1 AND id = $2"
        ))
        .bind(workspace_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file node", e))
    }

    /// Whether any node lies strictly beneath `dir_path`.
    pub async fn has_descendants(&self, workspace_id: Uuid, dir_path: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM file_nodes \
             WHERE workspace_id = $1 AND path LIKE $2 ESCAPE '\\')",
        )
        .bind(workspace_id)
        .bind(descendant_pattern(dir_path))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check descendants", e))
    }

    /// Insert a node.
    pub async fn create(&self, node: &FileNode) -> AppResult<FileNode> {
        insert_node(&self.pool, node).await
    }

    /// Insert nodes and their versions in one transaction.
    pub async fn create_batch(
        &self,
        nodes: &[FileNode],
        versions: &[FileVersion],
    ) -> AppResult<Vec<FileNode>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut created = Vec::with_capacity(nodes.len());
        for node in nodes {
            created.push(insert_node(&mut *tx, node).await?);
        }
        for version in versions {
            insert_version(&mut *tx, version).await?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit node batch", e)
        })?;
        Ok(created)
    }

    /// Update a node's content and metadata if its revision is still
    /// `expected_revision`.
    pub async fn update(&self, node: &FileNode, expected_revision: i64) -> AppResult<FileNode> {
        let updated = sqlx::query_as::<_, FileNode>(&format!(
            "UPDATE file_nodes SET content = $3, size_bytes = $4, mime_type = $5, \
             permissions = $6, updated_at = $7, revision = $8 \
             WHERE workspace_id = $1 AND id = $2 AND revision = $9 RETURNING {NODE_COLUMNS}"
        ))
        .bind(node.workspace_id)
        .bind(node.id)
        .bind(&node.content)
        .bind(node.size_bytes)
        .bind(&node.mime_type)
        .bind(node.permissions)
        .bind(node.updated_at)
        .bind(node.revision)
        .bind(expected_revision)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file node", e))?;

        match updated {
            Some(node) => Ok(node),
            None if self.find_by_id(node.workspace_id, node.id).await?.is_some() => Err(
                AppError::conflict(format!("File was modified concurrently: {}", node.path)),
            ),
            None => Err(AppError::not_found(format!("File not found: {}", node.path))),
        }
    }

    /// Move a node and its whole subtree in one transaction.
    pub async fn move_subtree(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        new_path: &str,
    ) -> AppResult<FileNode> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut node = sqlx::query_as::<_, FileNode>(&format!(
            "SELECT {NODE_COLUMNS} FROM file_nodes WHERE workspace_id = $1 AND id = $2 FOR UPDATE"
        ))
        .bind(workspace_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file node", e))?
        .ok_or_else(|| AppError::not_found(format!("File node {id} not found")))?;

        let old_path = node.path.clone();

        // Descendants first; the node row is rewritten separately below.
        sqlx::query(
            "UPDATE file_nodes SET path = $3 || substr(path, char_length($2) + 1), \
             updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond'), \
             revision = revision + 1 \
             WHERE workspace_id = $1 AND path LIKE $4 ESCAPE '\\'",
        )
        .bind(workspace_id)
        .bind(&old_path)
        .bind(new_path)
        .bind(descendant_pattern(&old_path))
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, new_path, "Failed to move descendants"))?;

        node.relocate(new_path);
        let moved = sqlx::query_as::<_, FileNode>(&format!(
            "UPDATE file_nodes SET path = $3, name = $4, mime_type = $5, updated_at = $6, \
             revision = $7 WHERE workspace_id = $1 AND id = $2 RETURNING {NODE_COLUMNS}"
        ))
        .bind(workspace_id)
        .bind(id)
        .bind(&node.path)
        .bind(&node.name)
        .bind(&node.mime_type)
        .bind(node.updated_at)
        .bind(node.revision)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, new_path, "Failed to move file node"))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit move", e)
        })?;

        Ok(moved)
    }

    /// Delete a node. Versions and drafts go with it via `ON DELETE CASCADE`.
    pub async fn delete(&self, workspace_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM file_nodes WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete file node", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

/// Insert one node row through any executor, pool or transaction.
async fn insert_node<'e, E>(executor: E, node: &FileNode) -> AppResult<FileNode>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, FileNode>(&format!(
        "INSERT INTO file_nodes (id, workspace_id, path, name, kind, content, size_bytes, \
         mime_type, permissions, created_at, updated_at, revision) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {NODE_COLUMNS}"
    ))
    .bind(node.id)
    .bind(node.workspace_id)
    .bind(&node.path)
    .bind(&node.name)
    .bind(node.kind)
    .bind(&node.content)
    .bind(node.size_bytes)
    .bind(&node.mime_type)
    .bind(node.permissions)
    .bind(node.created_at)
    .bind(node.updated_at)
    .bind(node.revision)
    .fetch_one(executor)
    .await
    .map_err(|e| write_error(e, &node.path, "Failed to create file node"))
}

/// `LIKE` pattern matching everything strictly beneath `base`.
fn descendant_pattern(base: &str) -> String {
    let escaped = base
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if escaped.is_empty() {
        "%".to_string()
    } else {
        format!("{escaped}/%")
    }
}

/// Map a write failure, turning a path unique violation into a conflict.
fn write_error(err: sqlx::Error, node_path: &str, context: &str) -> AppError {
    let unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if unique_violation {
        AppError::conflict(format!("Path already exists: {node_path}"))
    } else {
        AppError::with_source(ErrorKind::Database, context, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_pattern_escapes_wildcards() {
        assert_eq!(descendant_pattern("src"), "src/%");
        assert_eq!(descendant_pattern("50%_off"), "50\\%\\_off/%");
        assert_eq!(descendant_pattern(""), "%");
    }
}
