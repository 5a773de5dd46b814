//! Workspace domain entities.

pub mod member;
pub mod model;

pub use member::{MemberRole, WorkspaceMember};
pub use model::Workspace;
