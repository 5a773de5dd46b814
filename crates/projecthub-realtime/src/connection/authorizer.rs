//! Join-time authorization.
//!
//! A connection may only enter a room with an [`AuthorizedMember`], and the
//! only way to obtain one is [`WorkspaceAuthorizer::authorize`].

use std::sync::Arc;

use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::result::AppResult;
use projecthub_database::store::AccessControl;

/// Caller identity established by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberIdentity {
    /// User ID.
    pub user_id: Uuid,
    /// Display name.
    pub user_name: String,
    /// Email.
    pub user_email: String,
}

/// A user cleared to join one workspace room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedMember {
    workspace_id: Uuid,
    identity: MemberIdentity,
}

impl AuthorizedMember {
    /// The room this member may join.
    pub fn workspace_id(&self) -> Uuid {
        self.workspace_id
    }

    /// Who the member is.
    pub fn identity(&self) -> &MemberIdentity {
        &self.identity
    }
}

/// Checks read access before a connection joins a room.
#[derive(Debug, Clone)]
pub struct WorkspaceAuthorizer {
    access: Arc<dyn AccessControl>,
}

impl WorkspaceAuthorizer {
    /// Creates a new authorizer.
    pub fn new(access: Arc<dyn AccessControl>) -> Self {
        Self { access }
    }

    /// Admit `identity` to `workspace_id`. Callers without read access get
    /// `NotFound`, the same as for a missing workspace.
    pub async fn authorize(
        &self,
        identity: MemberIdentity,
        workspace_id: Uuid,
    ) -> AppResult<AuthorizedMember> {
        if !self
            .access
            .has_read_access(workspace_id, identity.user_id)
            .await?
        {
            return Err(AppError::not_found("Workspace not found"));
        }
        Ok(AuthorizedMember {
            workspace_id,
            identity,
        })
    }
}

#[cfg(test)]
pub(crate) fn admit(workspace_id: Uuid, identity: MemberIdentity) -> AuthorizedMember {
    AuthorizedMember {
        workspace_id,
        identity,
    }
}
