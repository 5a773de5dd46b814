//! Normalized tree query options and the system-file denylist.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Names hidden from tree listings unless system files are requested.
///
/// A node is hidden when any segment of its path matches.
pub const SYSTEM_FILE_NAMES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".bzr",
    "node_modules",
    "bower_components",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".venv",
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".Spotlight-V100",
    ".Trashes",
];

/// The recognized tree query flags, already normalized.
///
/// The transport layer converts its loosely-typed query string into this
/// before calling the tree service; the builder never sees raw input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOptions {
    /// Include entries on the system-file denylist.
    pub include_system_files: bool,
    /// Return a single level plus `has_children` hints.
    pub lazy: bool,
    /// Case-insensitive substring filter on name or path.
    pub search: Option<String>,
    /// Depth limit below the base path; capped by configuration.
    pub max_depth: Option<usize>,
}

impl TreeOptions {
    /// Set the search term. Blank terms clear the filter.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let term = search.into();
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Enable lazy mode.
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Include system files.
    pub fn with_system_files(mut self) -> Self {
        self.include_system_files = true;
        self
    }

    /// The lowercased search term, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Decides which paths count as system files.
#[derive(Debug, Clone)]
pub struct SystemFileFilter {
    names: HashSet<String>,
}

impl SystemFileFilter {
    /// Built-in denylist extended with `extra` names.
    pub fn new(extra: &[String]) -> Self {
        let names = SYSTEM_FILE_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(extra.iter().cloned())
            .collect();
        Self { names }
    }

    /// Whether any segment of `path` is on the denylist.
    pub fn is_system_path(&self, path: &str) -> bool {
        path.split('/').any(|segment| self.names.contains(segment))
    }
}

impl Default for SystemFileFilter {
    fn default() -> Self {
        Self::new(&[])
    }
}
