//! Permission checks in front of every listing and mutation.

use std::sync::Arc;

use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::result::AppResult;
use projecthub_database::store::AccessControl;
use projecthub_entity::file::FileNode;

use crate::context::RequestContext;

/// Turns access-control answers into errors.
///
/// Missing read access is reported as `NotFound` so that callers cannot
/// probe for workspaces they are not a member of.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    access: Arc<dyn AccessControl>,
}

impl AccessGuard {
    /// Creates a new access guard.
    pub fn new(access: Arc<dyn AccessControl>) -> Self {
        Self { access }
    }

    /// Require read access to the workspace.
    pub async fn require_read(&self, ctx: &RequestContext, workspace_id: Uuid) -> AppResult<()> {
        if self.access.has_read_access(workspace_id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Workspace not found"))
        }
    }

    /// Require write access to the workspace.
    pub async fn require_write(&self, ctx: &RequestContext, workspace_id: Uuid) -> AppResult<()> {
        self.require_read(ctx, workspace_id).await?;
        if self.access.has_write_access(workspace_id, ctx.user_id).await? {
            Ok(())
        } else {
            Err(AppError::forbidden("Write access to this workspace is denied"))
        }
    }

    /// Require write access to a specific node. Read-only nodes are
    /// writable by the workspace owner alone.
    pub async fn require_node_write(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        node: &FileNode,
    ) -> AppResult<()> {
        self.require_write(ctx, workspace_id).await?;
        if node.is_read_only() && !self.access.is_owner(workspace_id, ctx.user_id).await? {
            return Err(AppError::forbidden(format!(
                "File is read-only: {}",
                node.path
            )));
        }
        Ok(())
    }
}
