//! Workspace path rules.
//!
//! Paths are slash-separated, relative to the workspace root, and carry no
//! leading or trailing slash and no empty segments. The workspace root
//! itself is the empty string.

use crate::error::AppError;
use crate::result::AppResult;

/// Maximum accepted path length in bytes.
pub const MAX_PATH_LENGTH: usize = 4096;

/// Normalizes a caller-supplied path into canonical form.
///
/// Backslashes become slashes, surrounding whitespace and slashes are
/// stripped, and repeated slashes collapse. `.` and `..` segments are
/// rejected rather than resolved.
pub fn normalize_path(raw: &str) -> AppResult<String> {
    if raw.len() > MAX_PATH_LENGTH {
        return Err(AppError::bad_request(format!(
            "Path exceeds {MAX_PATH_LENGTH} bytes"
        )));
    }
    if raw.contains('\0') {
        return Err(AppError::bad_request("Path contains a NUL byte"));
    }

    let unified = raw.trim().replace('\\', "/");
    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(AppError::bad_request(format!(
                    "Relative segment '{segment}' is not allowed in path '{raw}'"
                )));
            }
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}

/// Normalizes a path that must name an entry (not the workspace root).
pub fn normalize_entry_path(raw: &str) -> AppResult<String> {
    let path = normalize_path(raw)?;
    if path.is_empty() {
        return Err(AppError::bad_request("Path must not be empty"));
    }
    Ok(path)
}

/// Returns the parent path, or `""` for top-level entries.
pub fn parent_of(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

/// Returns the last segment of a path.
pub fn file_name(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[idx + 1..]).unwrap_or(path)
}

/// Number of segments in a path. The root has depth 0.
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split('/').count()
    }
}

/// Returns whether `path` equals `base` or lies beneath it.
pub fn is_within(path: &str, base: &str) -> bool {
    if base.is_empty() {
        return true;
    }
    path == base || (path.starts_with(base) && path.as_bytes().get(base.len()) == Some(&b'/'))
}

/// Returns whether `path` lies strictly beneath `base`.
pub fn is_descendant(path: &str, base: &str) -> bool {
    path != base && is_within(path, base)
}

/// Depth of `path` measured from `base`, or `None` if it lies outside.
pub fn relative_depth(path: &str, base: &str) -> Option<usize> {
    if !is_within(path, base) {
        return None;
    }
    Some(depth(path) - depth(base))
}

/// Joins a base path and a child name.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Re-roots `path` from `old_base` onto `new_base`.
///
/// Returns `None` if `path` is not within `old_base`.
pub fn rebase(path: &str, old_base: &str, new_base: &str) -> Option<String> {
    if !is_within(path, old_base) {
        return None;
    }
    let suffix = &path[old_base.len()..];
    Some(format!("{new_base}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_collapses() {
        assert_eq!(normalize_path("/dir//b.txt/").unwrap(), "dir/b.txt");
        assert_eq!(normalize_path("  \\src\\main.rs ").unwrap(), "src/main.rs");
        assert_eq!(normalize_path("").unwrap(), "");
        assert_eq!(normalize_path("///").unwrap(), "");
    }

    #[test]
    fn test_normalize_rejects_relative_segments() {
        assert!(normalize_path("a/../b").is_err());
        assert!(normalize_path("./a").is_err());
        assert!(normalize_entry_path("/").is_err());
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_of("dir/sub/file.rs"), "dir/sub");
        assert_eq!(parent_of("file.rs"), "");
        assert_eq!(file_name("dir/sub/file.rs"), "file.rs");
        assert_eq!(file_name("file.rs"), "file.rs");
    }

    #[test]
    fn test_within_does_not_match_sibling_prefix() {
        assert!(is_within("dir/b.txt", "dir"));
        assert!(is_within("dir", "dir"));
        assert!(!is_within("dir2/b.txt", "dir"));
        assert!(is_within("anything", ""));
        assert!(!is_descendant("dir", "dir"));
    }

    #[test]
    fn test_relative_depth() {
        assert_eq!(relative_depth("a.txt", ""), Some(1));
        assert_eq!(relative_depth("dir/b.txt", "dir"), Some(1));
        assert_eq!(relative_depth("dir", "dir"), Some(0));
        assert_eq!(relative_depth("other/b.txt", "dir"), None);
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase("src/lib/mod.rs", "src", "pkg/src").as_deref(),
            Some("pkg/src/lib/mod.rs")
        );
        assert_eq!(rebase("src", "src", "core").as_deref(), Some("core"));
        assert_eq!(rebase("srcs/x", "src", "core"), None);
    }
}
