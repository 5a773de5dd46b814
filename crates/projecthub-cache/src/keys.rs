//! Cache key builders for every ProjectHub cache entry.

use uuid::Uuid;

// ── Tree keys ──────────────────────────────────────────────

/// Cache key for a tree listing.
///
/// `shape` is the serialized query shape. Embedding `generation` in the key
/// means a bumped workspace never reads an entry captured before the bump.
pub fn tree_listing(workspace_id: Uuid, generation: i64, shape: &str) -> String {
    format!("tree:{workspace_id}:{generation}:{shape}")
}
