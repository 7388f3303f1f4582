//! Depth-first flattening of a [`FileNode`] tree into an ordered file list.

use std::collections::BTreeSet;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::FileNode;
use crate::error::ConfigError;

/// Directory names skipped unless the configuration says otherwise.
pub const DEFAULT_EXCLUDED_DIRECTORIES: [&str; 6] =
    ["node_modules", ".git", ".next", "dist", "build", ".cache"];

/// Default maximum nesting depth below the root.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Which parts of a tree to skip during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Directory names that are never descended into.
    pub excluded_directory_names: BTreeSet<String>,
    /// Glob patterns matched against entry names and root-relative paths.
    pub excluded_patterns: BTreeSet<String>,
    /// Include entries whose name starts with `.`.
    pub include_hidden: bool,
    /// Deepest level visited; the root's children are level 0.
    pub max_depth: usize,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            excluded_directory_names: DEFAULT_EXCLUDED_DIRECTORIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            excluded_patterns: BTreeSet::new(),
            include_hidden: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiled form of an [`ExclusionConfig`].
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    directory_names: BTreeSet<String>,
    patterns: GlobSet,
    include_hidden: bool,
    max_depth: usize,
}

impl ExclusionFilter {
    /// Compiles the glob patterns of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] if a pattern is not a valid glob.
    pub fn new(config: &ExclusionConfig) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.excluded_patterns {
            let glob = Glob::new(pattern)
                .map_err(|source| ConfigError::Pattern { pattern: pattern.clone(), source })?;
            builder.add(glob);
        }
        let patterns = builder
            .build()
            .map_err(|source| ConfigError::Pattern { pattern: String::new(), source })?;
        Ok(Self {
            directory_names: config.excluded_directory_names.clone(),
            patterns,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
        })
    }

    /// Deepest level visited.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns `true` if the directory must not be descended into.
    #[must_use]
    pub fn excludes_directory(&self, name: &str, path: &str) -> bool {
        self.directory_names.contains(name) || self.excludes_entry(name, path)
    }

    /// Returns `true` if the file must be left out.
    #[must_use]
    pub fn excludes_file(&self, name: &str, path: &str) -> bool {
        self.excludes_entry(name, path)
    }

    fn excludes_entry(&self, name: &str, path: &str) -> bool {
        (!self.include_hidden && name.starts_with('.'))
            || self.patterns.is_match(name)
            || self.patterns.is_match(path)
    }
}

/// A file reached by [`flatten`], with its traversal path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEntry<'a> {
    /// Root-relative path built from the names along the traversal.
    pub path: &'a str,
    /// The file node.
    pub node: &'a FileNode,
}

/// Flattens `root` into its files, depth-first in sibling insertion order.
///
/// Excluded directories are skipped without visiting any descendant, and
/// subtrees below `max_depth` are dropped silently. Paths are the nodes' own
/// root-relative paths, so they are unique whenever the tree was built with
/// [`FileNode::insert_file`] or [`snapshot`](super::snapshot).
#[must_use]
pub fn flatten<'a>(root: &'a FileNode, filter: &ExclusionFilter) -> Vec<FlatEntry<'a>> {
    let mut files = Vec::new();
    // Children are pushed in reverse so the stack pops them in insertion order.
    let mut stack: Vec<(&FileNode, usize)> =
        root.children.values().rev().map(|child| (child, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        if node.is_file() {
            if !filter.excludes_file(&node.name, &node.path) {
                files.push(FlatEntry { path: &node.path, node });
            }
            continue;
        }
        if filter.excludes_directory(&node.name, &node.path) {
            debug!(path = %node.path, "skipping excluded directory");
            continue;
        }
        if depth + 1 > filter.max_depth {
            continue;
        }
        stack.extend(node.children.values().rev().map(|child| (child, depth + 1)));
    }

    files
}

/// Sum of known file sizes reachable through [`flatten`] and the matching file count.
#[must_use]
pub fn reachable_size(root: &FileNode, filter: &ExclusionFilter) -> (usize, u64) {
    let files = flatten(root, filter);
    let total = files.iter().filter_map(|entry| entry.node.size).sum();
    (files.len(), total)
}
