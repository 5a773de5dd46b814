//! Tree listing service.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_core::path;
use projecthub_core::result::AppResult;
use projecthub_database::store::{NodeQuery, RecordStore};
use projecthub_entity::tree::{DirectoryChildren, TreeItem, TreeResult};

use crate::access::AccessGuard;
use crate::context::RequestContext;
use crate::generation::GenerationCounter;

use super::builder::{TreeBuilder, sort_items};
use super::cache::TreeCache;
use super::options::{SystemFileFilter, TreeOptions};

/// Serves tree listings, from cache when the generation still matches.
#[derive(Debug, Clone)]
pub struct TreeService {
    store: Arc<dyn RecordStore>,
    guard: AccessGuard,
    generations: GenerationCounter,
    cache: TreeCache,
    system_files: Arc<SystemFileFilter>,
    depth_cap: usize,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        store: Arc<dyn RecordStore>,
        guard: AccessGuard,
        generations: GenerationCounter,
        cache: TreeCache,
        system_files: Arc<SystemFileFilter>,
        depth_cap: usize,
    ) -> Self {
        Self {
            store,
            guard,
            generations,
            cache,
            system_files,
            depth_cap,
        }
    }

    /// List the tree under `base_path`.
    ///
    /// The generation is read before the nodes, so a listing stored under
    /// generation `g` reflects at least every write that bumped to `g`.
    pub async fn get_tree(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        base_path: &str,
        options: &TreeOptions,
    ) -> AppResult<TreeResult> {
        self.guard.require_read(ctx, workspace_id).await?;
        let base = path::normalize_path(base_path)?;

        let generation = self.generations.current(workspace_id).await?;
        let key = self.cache.key(workspace_id, generation, &base, options);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }

        let builder = TreeBuilder::new(&base, options, &self.system_files, self.depth_cap);
        let nodes = self
            .store
            .find_file_nodes(
                workspace_id,
                &NodeQuery::under(base.clone(), Some(builder.fetch_depth())),
            )
            .await?;
        let fetched = nodes.len();
        let (items, total) = builder.build(nodes);

        debug!(
            workspace_id = %workspace_id,
            base_path = %base,
            generation,
            fetched,
            total,
            "Tree built"
        );

        let result = TreeResult {
            items,
            total,
            base_path: base,
            generation,
        };
        self.cache.put(&key, &result).await;
        Ok(result)
    }

    /// Immediate children of a directory, read straight from the store.
    pub async fn get_directory_children(
        &self,
        ctx: &RequestContext,
        workspace_id: Uuid,
        dir_path: &str,
        include_system_files: bool,
    ) -> AppResult<DirectoryChildren> {
        self.guard.require_read(ctx, workspace_id).await?;
        let dir = path::normalize_path(dir_path)?;

        if !dir.is_empty() {
            let node = self
                .store
                .find_file_node(workspace_id, &dir)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Directory not found: {dir}")))?;
            if !node.is_directory() {
                return Err(AppError::bad_request(format!("Not a directory: {dir}")));
            }
        }

        let nodes = self
            .store
            .find_file_nodes(workspace_id, &NodeQuery::under(dir.clone(), Some(2)))
            .await?;

        let hidden = |p: &str| {
            !include_system_files
                && self
                    .system_files
                    .is_system_path(p[dir.len()..].trim_start_matches('/'))
        };

        let mut grandchild_parents = std::collections::HashSet::new();
        let mut children = Vec::new();
        for node in &nodes {
            if hidden(&node.path) {
                continue;
            }
            match path::relative_depth(&node.path, &dir) {
                Some(1) => children.push(node),
                Some(2) => {
                    grandchild_parents.insert(path::parent_of(&node.path).to_string());
                }
                _ => {}
            }
        }

        let mut items: Vec<TreeItem> = children
            .into_iter()
            .map(|node| {
                let mut item = TreeItem::from_node(node);
                if node.is_directory() {
                    item.has_children = Some(grandchild_parents.contains(&node.path));
                }
                item
            })
            .collect();
        sort_items(&mut items);

        Ok(DirectoryChildren {
            total: items.len(),
            path: dir,
            items,
        })
    }
}
