//! Turns a flat, path-keyed node list into a nested tree.
//!
//! The builder is pure: it never touches the store or the cache, so the
//! same input always yields the same output.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use projecthub_core::path;
use projecthub_entity::file::FileNode;
use projecthub_entity::tree::TreeItem;

use super::options::{SystemFileFilter, TreeOptions};

/// Builds one tree listing for a base path and option set.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    base_path: &'a str,
    options: &'a TreeOptions,
    system_files: &'a SystemFileFilter,
    depth_cap: usize,
}

impl<'a> TreeBuilder<'a> {
    /// `base_path` must already be normalized.
    pub fn new(
        base_path: &'a str,
        options: &'a TreeOptions,
        system_files: &'a SystemFileFilter,
        depth_cap: usize,
    ) -> Self {
        Self {
            base_path,
            options,
            system_files,
            depth_cap,
        }
    }

    /// Levels below the base that appear in the output.
    pub fn visible_depth(&self) -> usize {
        if self.options.lazy {
            1
        } else {
            self.options
                .max_depth
                .map_or(self.depth_cap, |depth| depth.min(self.depth_cap))
        }
    }

    /// Levels below the base to fetch. Lazy listings read one extra level
    /// to answer `has_children`.
    pub fn fetch_depth(&self) -> usize {
        if self.options.lazy {
            self.visible_depth() + 1
        } else {
            self.visible_depth()
        }
    }

    /// Build the listing. Returns the root items and the number of nodes
    /// that survived filtering.
    pub fn build(&self, nodes: Vec<FileNode>) -> (Vec<TreeItem>, usize) {
        let visible_depth = self.visible_depth();
        let mut visible = Vec::new();
        let mut lookahead = Vec::new();

        for node in nodes {
            let Some(depth) = path::relative_depth(&node.path, self.base_path) else {
                continue;
            };
            if depth > 0 && !self.options.include_system_files && self.is_hidden(&node.path) {
                continue;
            }
            if depth <= visible_depth {
                visible.push(node);
            } else if self.options.lazy && depth == visible_depth + 1 {
                lookahead.push(node.path);
            }
        }

        let non_empty_dirs: HashSet<String> = if self.options.lazy {
            visible
                .iter()
                .map(|n| n.path.as_str())
                .chain(lookahead.iter().map(String::as_str))
                .map(|p| path::parent_of(p).to_string())
                .collect()
        } else {
            HashSet::new()
        };

        if let Some(term) = self.options.search_term() {
            visible.retain(|n| {
                n.name.to_lowercase().contains(&term) || n.path.to_lowercase().contains(&term)
            });
        }
        let total = visible.len();

        let present: HashSet<&str> = visible.iter().map(|n| n.path.as_str()).collect();
        let mut children_of: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (idx, node) in visible.iter().enumerate() {
            let parent = path::parent_of(&node.path);
            // Nodes whose parent was not fetched or was filtered out become roots.
            if node.path == self.base_path || !present.contains(parent) {
                roots.push(idx);
            } else {
                children_of.entry(parent).or_default().push(idx);
            }
        }

        let assembler = Assembler {
            nodes: &visible,
            children_of: &children_of,
            non_empty_dirs: &non_empty_dirs,
            lazy: self.options.lazy,
        };
        let mut items: Vec<TreeItem> = roots.into_iter().map(|idx| assembler.assemble(idx)).collect();
        sort_items(&mut items);
        (items, total)
    }

    fn is_hidden(&self, node_path: &str) -> bool {
        let relative = node_path[self.base_path.len()..].trim_start_matches('/');
        self.system_files.is_system_path(relative)
    }
}

struct Assembler<'n> {
    nodes: &'n [FileNode],
    children_of: &'n HashMap<&'n str, Vec<usize>>,
    non_empty_dirs: &'n HashSet<String>,
    lazy: bool,
}

impl Assembler<'_> {
    fn assemble(&self, idx: usize) -> TreeItem {
        let node = &self.nodes[idx];
        let mut item = TreeItem::from_node(node);
        if node.is_directory() {
            let mut children: Vec<TreeItem> = self
                .children_of
                .get(node.path.as_str())
                .map(|ids| ids.iter().map(|&child| self.assemble(child)).collect())
                .unwrap_or_default();
            sort_items(&mut children);
            item.children_count = Some(children.len());
            if self.lazy {
                item.has_children = Some(self.non_empty_dirs.contains(&node.path));
            }
            item.children = children;
        }
        item
    }
}

/// Directories before files, then by name ignoring case.
pub fn sort_items(items: &mut [TreeItem]) {
    items.sort_by(|a, b| match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });
}
