//! Shared fixture for service tests: an in-memory store, a moka-backed
//! tree cache, and one workspace with an owner, an editor, and a viewer.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use projecthub_cache::memory::MemoryCacheProvider;
use projecthub_core::config::{MemoryCacheConfig, WorkspaceConfig};
use projecthub_core::events::FileChangeEvent;
use projecthub_core::traits::ChangeNotifier;
use projecthub_database::MemoryRecordStore;
use projecthub_database::store::RecordStore;
use projecthub_entity::file::{FileNode, FilePermission};
use projecthub_entity::workspace::MemberRole;

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::draft::DraftService;
use crate::file::{ContentRead, FileContent, FileService, LineRange};
use crate::generation::GenerationCounter;
use crate::tree::{SystemFileFilter, TreeCache, TreeService};
use crate::version::VersionService;

/// Notifier that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<FileChangeEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<FileChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ChangeNotifier for RecordingNotifier {
    fn notify_file_changed(&self, _workspace_id: Uuid, event: FileChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct Fixture {
    pub store: Arc<MemoryRecordStore>,
    pub ws: Uuid,
    pub owner: RequestContext,
    pub editor: RequestContext,
    pub viewer: RequestContext,
    pub notifier: Arc<RecordingNotifier>,
    pub generations: GenerationCounter,
    pub tree: TreeService,
    pub files: FileService,
    pub versions: VersionService,
    pub drafts: DraftService,
    pub max_content_bytes: u64,
}

impl Fixture {
    pub async fn new() -> Self {
        let config = WorkspaceConfig {
            max_content_bytes: 64 * 1024,
            ..WorkspaceConfig::default()
        };

        let store = Arc::new(MemoryRecordStore::new());
        let owner = RequestContext::new(Uuid::new_v4(), "olivia", "olivia@example.com");
        let editor = RequestContext::new(Uuid::new_v4(), "ed", "ed@example.com");
        let viewer = RequestContext::new(Uuid::new_v4(), "vic", "vic@example.com");

        let ws = store.create_workspace("fixture", owner.user_id).await.id;
        store.add_member(ws, editor.user_id, MemberRole::Editor).await;
        store.add_member(ws, viewer.user_id, MemberRole::Viewer).await;

        let records: Arc<dyn RecordStore> = store.clone();
        let guard = AccessGuard::new(store.clone());
        let generations = GenerationCounter::new(records.clone());
        let notifier = Arc::new(RecordingNotifier::default());

        let provider = Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig::default(),
            config.tree_cache_ttl_seconds,
        ));
        let tree = TreeService::new(
            records.clone(),
            guard.clone(),
            generations.clone(),
            TreeCache::new(provider, config.tree_cache_ttl()),
            Arc::new(SystemFileFilter::new(&config.extra_system_files)),
            config.max_tree_depth,
        );
        let versions = VersionService::new(
            records.clone(),
            guard.clone(),
            generations.clone(),
            notifier.clone(),
            config.history_page_max,
        );
        let drafts = DraftService::new(records.clone(), guard.clone(), config.max_content_bytes);
        let files = FileService::new(
            records,
            guard,
            generations.clone(),
            versions.clone(),
            drafts.clone(),
            notifier.clone(),
            config.max_content_bytes,
        );

        Self {
            store,
            ws,
            owner,
            editor,
            viewer,
            notifier,
            generations,
            tree,
            files,
            versions,
            drafts,
            max_content_bytes: config.max_content_bytes,
        }
    }

    /// `a.txt` ("hello"), `dir/`, and `dir/b.txt` ("world").
    pub async fn seed_example(&self) {
        self.files
            .create_file(&self.owner, self.ws, "a.txt", Some("hello".into()))
            .await
            .unwrap();
        self.files
            .create_directory(&self.owner, self.ws, "dir")
            .await
            .unwrap();
        self.files
            .create_file(&self.owner, self.ws, "dir/b.txt", Some("world".into()))
            .await
            .unwrap();
    }

    pub async fn read(&self, ctx: &RequestContext, path: &str, range: LineRange) -> FileContent {
        match self
            .files
            .get_content(ctx, self.ws, path, range, None)
            .await
            .unwrap()
        {
            ContentRead::Content(content) => content,
            ContentRead::NotModified { .. } => panic!("unconditional read returned 304"),
        }
    }

    pub async fn set_permission(&self, mut node: FileNode, permission: FilePermission) {
        node.permissions = permission;
        let revision = node.revision;
        self.store.update_file_node(&node, revision).await.unwrap();
    }
}
