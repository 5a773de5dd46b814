//! Line-window pagination and ETags for file content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::result::AppResult;
use projecthub_entity::file::FileNode;

/// Requested 1-based, inclusive line window. Both ends are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
}

impl LineRange {
    /// The whole file.
    pub fn full() -> Self {
        Self::default()
    }
}

/// A slice of file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentWindow {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
    pub total_lines: usize,
    pub has_more: bool,
}

/// Cut `content` to `range`.
///
/// Lines keep their terminators, so the full window reproduces the
/// content byte for byte.
pub fn slice_lines(content: &str, range: LineRange) -> AppResult<ContentWindow> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let total = lines.len();

    let start = range.start_line.unwrap_or(1);
    if start == 0 {
        return Err(AppError::bad_request("start_line is 1-based"));
    }
    if start > total.max(1) {
        return Err(AppError::bad_request(format!(
            "start_line {start} is beyond the file's {total} lines"
        )));
    }
    let end = range.end_line.unwrap_or(total).min(total);
    if range.end_line.is_some_and(|e| e < start) {
        return Err(AppError::bad_request(format!(
            "end_line must not precede start_line {start}"
        )));
    }

    let text = if total == 0 {
        String::new()
    } else {
        lines[start - 1..end].concat()
    };

    Ok(ContentWindow {
        text,
        start_line: start,
        end_line: end,
        total_lines: total,
        has_more: end < total,
    })
}

/// Quoted hex SHA-256 over path, modification time, revision, size, and
/// window.
pub fn compute_etag(
    path: &str,
    updated_at: DateTime<Utc>,
    revision: i64,
    size_bytes: i64,
    start_line: usize,
    end_line: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{path}|{}|{revision}|{size_bytes}|{start_line}-{end_line}",
            updated_at.timestamp_micros()
        )
        .as_bytes(),
    );
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` value matches `etag`.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
        candidate == "*" || candidate == etag || candidate == etag.trim_matches('"')
    })
}

/// File content plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub file_id: Uuid,
    pub path: String,
    pub content: String,
    pub size: i64,
    pub mime_type: String,
    pub updated_at: DateTime<Utc>,
    pub start_line: usize,
    pub end_line: usize,
    pub total_lines: usize,
    pub has_more: bool,
    pub etag: String,
    /// Set when the content came from a draft rather than the saved file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<Uuid>,
}

impl FileContent {
    /// Window `content` as if it were `node`'s content.
    pub fn from_node(node: &FileNode, content: &str, range: LineRange) -> AppResult<Self> {
        let window = slice_lines(content, range)?;
        Ok(Self {
            file_id: node.id,
            path: node.path.clone(),
            etag: compute_etag(
                &node.path,
                node.updated_at,
                node.revision,
                node.size_bytes,
                window.start_line,
                window.end_line,
            ),
            content: window.text,
            size: node.size_bytes,
            mime_type: node.mime_type.clone(),
            updated_at: node.updated_at,
            start_line: window.start_line,
            end_line: window.end_line,
            total_lines: window.total_lines,
            has_more: window.has_more,
            draft_id: None,
        })
    }
}

/// Outcome of a conditional content read.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRead {
    Content(FileContent),
    NotModified { etag: String },
}
