//! Generation-keyed memoization of tree listings.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use projecthub_cache::keys;
use projecthub_core::traits::cache::{CacheProvider, CacheProviderExt};
use projecthub_entity::tree::TreeResult;

use super::options::TreeOptions;

/// The part of a tree request that determines its result.
#[derive(Serialize)]
struct QueryShape<'a> {
    base: &'a str,
    system: bool,
    lazy: bool,
    search: Option<String>,
    depth: Option<usize>,
}

/// Tree-listing cache over any [`CacheProvider`].
///
/// Entries are never deleted on mutation. A mutation bumps the workspace
/// generation, which is part of every key, so later reads miss and the
/// stale entry ages out through TTL or capacity eviction. Cache failures
/// degrade to misses.
#[derive(Debug, Clone)]
pub struct TreeCache {
    provider: Arc<dyn CacheProvider>,
    ttl: Duration,
}

impl TreeCache {
    /// Creates a new tree cache.
    pub fn new(provider: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self { provider, ttl }
    }

    /// Key for a listing captured at `generation`.
    pub fn key(
        &self,
        workspace_id: Uuid,
        generation: i64,
        base_path: &str,
        options: &TreeOptions,
    ) -> String {
        let shape = QueryShape {
            base: base_path,
            system: options.include_system_files,
            lazy: options.lazy,
            search: options.search_term(),
            depth: if options.lazy { None } else { options.max_depth },
        };
        // Serializing plain strings, bools and integers cannot fail.
        let shape = serde_json::to_string(&shape).unwrap_or_default();
        keys::tree_listing(workspace_id, generation, &shape)
    }

    /// Look up a listing.
    pub async fn get(&self, key: &str) -> Option<TreeResult> {
        match self.provider.get_json::<TreeResult>(key).await {
            Ok(Some(hit)) => {
                debug!(key, "Tree cache hit");
                Some(hit)
            }
            Ok(None) => {
                debug!(key, "Tree cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Tree cache read failed");
                None
            }
        }
    }

    /// Store a listing.
    pub async fn put(&self, key: &str, result: &TreeResult) {
        if let Err(e) = self.provider.set_json(key, result, self.ttl).await {
            warn!(key, error = %e, "Tree cache write failed");
        }
    }
}
