//! Workspace limits and tree settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits applied to workspace content and tree queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Largest accepted file or draft content in bytes.
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: u64,
    /// Hard cap on tree depth below the base path.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// TTL of cached tree listings in seconds.
    #[serde(default = "default_tree_cache_ttl")]
    pub tree_cache_ttl_seconds: u64,
    /// Largest accepted history page.
    #[serde(default = "default_history_page_max")]
    pub history_page_max: u64,
    /// Names hidden from trees in addition to the built-in denylist.
    #[serde(default)]
    pub extra_system_files: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content_bytes(),
            max_tree_depth: default_max_tree_depth(),
            tree_cache_ttl_seconds: default_tree_cache_ttl(),
            history_page_max: default_history_page_max(),
            extra_system_files: Vec::new(),
        }
    }
}

impl WorkspaceConfig {
    /// Tree cache TTL.
    pub fn tree_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.tree_cache_ttl_seconds)
    }
}

fn default_max_content_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_max_tree_depth() -> usize {
    20
}

fn default_tree_cache_ttl() -> u64 {
    300
}

fn default_history_page_max() -> u64 {
    100
}
