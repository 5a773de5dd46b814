//! Request DTOs with validation.
//!
//! Query strings and bodies are normalized here into service types; the
//! services never see the wire representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use projecthub_core::error::AppError;
use projecthub_service::TreeOptions;
use projecthub_service::file::LineRange;

use crate::error::ApiError;

/// Run the derived validation rules, mapping failures to `BadRequest`.
pub fn validated<T: Validate>(body: T) -> Result<T, ApiError> {
    body.validate()
        .map_err(|e| AppError::bad_request(format!("Invalid request: {e}")))?;
    Ok(body)
}

/// `GET …/tree` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TreeQuery {
    /// Base path; empty or absent means the workspace root.
    #[serde(default)]
    pub path: String,
    /// One level plus `hasChildren` hints.
    #[serde(default)]
    pub lazy: bool,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
    /// Include VCS metadata, dependency folders, and OS clutter.
    #[serde(default)]
    pub include_system_files: bool,
    /// Depth limit below the base path.
    #[validate(range(min = 1))]
    pub max_depth: Option<usize>,
}

impl TreeQuery {
    /// Normalize into the tree service's option set.
    pub fn options(&self) -> TreeOptions {
        let mut options = TreeOptions {
            include_system_files: self.include_system_files,
            lazy: self.lazy,
            search: None,
            max_depth: self.max_depth,
        };
        if let Some(search) = &self.search {
            options = options.with_search(search.as_str());
        }
        options
    }
}

/// `GET …/tree/children` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenQuery {
    /// Directory path; empty lists the root.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub include_system_files: bool,
}

/// `GET …/content` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    /// 1-based first line.
    #[validate(range(min = 1))]
    pub start_line: Option<usize>,
    /// 1-based last line, inclusive.
    #[validate(range(min = 1))]
    pub end_line: Option<usize>,
}

impl ContentQuery {
    pub fn range(&self) -> LineRange {
        LineRange {
            start_line: self.start_line,
            end_line: self.end_line,
        }
    }
}

/// Query carrying only a path.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PathQuery {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}

/// `PUT …/content` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveContentRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub content: String,
    /// The `updatedAt` the client last read. Omit to overwrite.
    pub last_modified: Option<DateTime<Utc>>,
    /// Version message.
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

/// `POST …/files` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFileRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub content: Option<String>,
}

/// `POST …/directories` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDirectoryRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
}

/// `POST …/files/move` and `POST …/files/copy` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferRequest {
    #[validate(length(min = 1, message = "from is required"))]
    pub from: String,
    #[validate(length(min = 1, message = "to is required"))]
    pub to: String,
}

/// `GET …/history` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    #[serde(default = "default_history_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_history_limit() -> u64 {
    50
}

/// `POST …/history/restore` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestoreVersionRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub version_id: Uuid,
}

/// `GET …/history/compare` query.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareQuery {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub from: Uuid,
    pub to: Uuid,
}

/// `PUT …/drafts` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveDraftRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub content: String,
}

/// `POST …/drafts/restore` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestoreDraftRequest {
    #[validate(length(min = 1, message = "path is required"))]
    pub path: String,
    pub draft_id: Uuid,
}
