//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use projecthub_cache::CacheManager;
use projecthub_core::config::AppConfig;
use projecthub_core::traits::ChangeNotifier;
use projecthub_database::store::{AccessControl, RecordStore};
use projecthub_realtime::{PresenceHub, WorkspaceAuthorizer};
use projecthub_service::tree::SystemFileFilter;
use projecthub_service::{
    AccessGuard, DraftService, FileService, GenerationCounter, TreeCache, TreeService,
    VersionService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for the health endpoint
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// Cache manager (Redis or in-memory)
    pub cache: Arc<CacheManager>,

    // ── Realtime ─────────────────────────────────────────────
    /// Presence hub
    pub presence: Arc<PresenceHub>,
    /// Join-time access check for WebSocket connections
    pub authorizer: Arc<WorkspaceAuthorizer>,

    // ── Services ─────────────────────────────────────────────
    /// Tree listings
    pub tree_service: Arc<TreeService>,
    /// Content and structural mutations
    pub file_service: Arc<FileService>,
    /// History, restore, compare
    pub version_service: Arc<VersionService>,
    /// Per-user drafts
    pub draft_service: Arc<DraftService>,
}

impl AppState {
    /// Wire services over a record store, an access-control source, and a
    /// cache. The presence hub receives every change notification.
    pub fn build(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        access: Arc<dyn AccessControl>,
        cache: Arc<CacheManager>,
    ) -> Self {
        let workspace = &config.workspace;

        let presence = Arc::new(PresenceHub::new(config.realtime.clone()));
        let notifier: Arc<dyn ChangeNotifier> = presence.clone();
        let authorizer = Arc::new(WorkspaceAuthorizer::new(Arc::clone(&access)));

        let guard = AccessGuard::new(access);
        let generations = GenerationCounter::new(Arc::clone(&store));

        let tree_service = TreeService::new(
            Arc::clone(&store),
            guard.clone(),
            generations.clone(),
            TreeCache::new(cache.provider(), workspace.tree_cache_ttl()),
            Arc::new(SystemFileFilter::new(&workspace.extra_system_files)),
            workspace.max_tree_depth,
        );
        let version_service = VersionService::new(
            Arc::clone(&store),
            guard.clone(),
            generations.clone(),
            Arc::clone(&notifier),
            workspace.history_page_max,
        );
        let draft_service =
            DraftService::new(Arc::clone(&store), guard.clone(), workspace.max_content_bytes);
        let file_service = FileService::new(
            store,
            guard,
            generations,
            version_service.clone(),
            draft_service.clone(),
            notifier,
            workspace.max_content_bytes,
        );

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            cache,
            presence,
            authorizer,
            tree_service: Arc::new(tree_service),
            file_service: Arc::new(file_service),
            version_service: Arc::new(version_service),
            draft_service: Arc::new(draft_service),
        }
    }
}
