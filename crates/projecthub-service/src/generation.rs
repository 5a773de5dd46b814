//! Per-workspace generation counter.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use projecthub_core::result::AppResult;
use projecthub_database::store::RecordStore;

/// Reads and bumps the tree-cache invalidation counter.
#[derive(Debug, Clone)]
pub struct GenerationCounter {
    store: Arc<dyn RecordStore>,
}

impl GenerationCounter {
    /// Creates a new generation counter.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The workspace's current generation.
    pub async fn current(&self, workspace_id: Uuid) -> AppResult<i64> {
        self.store.get_generation(workspace_id).await
    }

    /// Increment the generation after a durable write.
    ///
    /// A failed bump is logged and swallowed: the write it follows has
    /// already succeeded, and stale tree entries still age out by TTL.
    pub async fn bump(&self, workspace_id: Uuid) -> Option<i64> {
        match self.store.bump_generation(workspace_id).await {
            Ok(generation) => {
                debug!(workspace_id = %workspace_id, generation, "Workspace generation bumped");
                Some(generation)
            }
            Err(e) => {
                warn!(workspace_id = %workspace_id, error = %e, "Failed to bump workspace generation");
                None
            }
        }
    }
}
