//! File tree model and snapshotting from a [`FileSource`].
//!
//! A [`FileNode`] tree is an explicit recursive structure: directories own an
//! ordered map from child name to child node, so sibling order is insertion
//! order and names are unique within a directory. The pipeline only ever
//! borrows a tree; it never mutates one.

pub mod flatten;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::FileSourceError;
use crate::ports::{join_path, EntryKind, FileSource};

pub use flatten::{flatten, reachable_size, ExclusionConfig, ExclusionFilter, FlatEntry};

/// Language tag used when an extension is not recognised.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// A file or directory in a snapshot tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Entry name (empty for the root).
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Root-relative, `/`-separated path (empty for the root).
    pub path: String,
    /// Language tag derived from the file extension.
    pub language: String,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Failure recorded while snapshotting this entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Children by name, in insertion order. Always empty for files.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, FileNode>,
}

impl FileNode {
    /// Creates an empty root directory.
    #[must_use]
    pub fn root() -> Self {
        Self::directory("")
    }

    /// Creates an empty directory node at `path`.
    #[must_use]
    pub fn directory(path: &str) -> Self {
        Self {
            name: base_name(path).to_string(),
            kind: EntryKind::Directory,
            path: path.to_string(),
            language: String::new(),
            size: None,
            last_modified: None,
            error: None,
            children: IndexMap::new(),
        }
    }

    /// Creates a file node at `path`, deriving its language from the name.
    #[must_use]
    pub fn file(path: &str) -> Self {
        let name = base_name(path);
        Self {
            name: name.to_string(),
            kind: EntryKind::File,
            path: path.to_string(),
            language: language_for(name).to_string(),
            size: None,
            last_modified: None,
            error: None,
            children: IndexMap::new(),
        }
    }

    /// Sets the known size of a file node.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Returns `true` for file nodes.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Inserts `node` as a child of this directory, replacing a same-named child.
    pub fn insert_child(&mut self, node: FileNode) {
        self.children.insert(node.name.clone(), node);
    }

    /// Inserts a file at the root-relative `path`, creating missing directories.
    ///
    /// Returns a mutable reference to the inserted file node.
    pub fn insert_file(&mut self, path: &str) -> &mut FileNode {
        let mut current = self;
        let mut prefix = String::new();
        let mut parts = path.split('/').filter(|part| !part.is_empty()).peekable();
        while let Some(part) = parts.next() {
            prefix = join_path(&prefix, part);
            let is_last = parts.peek().is_none();
            current = current.children.entry(part.to_string()).or_insert_with(|| {
                if is_last {
                    FileNode::file(&prefix)
                } else {
                    FileNode::directory(&prefix)
                }
            });
        }
        current
    }

    /// Returns `true` if any file exists anywhere below this node.
    #[must_use]
    pub fn has_files(&self) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_file() {
                return true;
            }
            stack.extend(node.children.values());
        }
        false
    }
}

/// Returns the last segment of a `/`-separated path.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Maps a file name to its language tag by extension.
#[must_use]
pub fn language_for(name: &str) -> &'static str {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return DEFAULT_LANGUAGE;
    };
    match ext.to_ascii_lowercase().as_str() {
        "js" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "md" => "markdown",
        "py" => "python",
        "rb" => "ruby",
        "go" => "go",
        "java" => "java",
        "php" => "php",
        "c" => "c",
        "cpp" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "kt" => "kotlin",
        "rs" => "rust",
        _ => DEFAULT_LANGUAGE,
    }
}

/// Builds a [`FileNode`] tree by walking `source`.
///
/// Exclusions are checked before a directory is listed, so excluded
/// directories and subtrees deeper than `max_depth` are never requested from
/// the source. A failed stat or subdirectory listing is recorded on the node
/// and the walk continues.
///
/// # Errors
///
/// Returns an error only when the root directory itself cannot be listed.
pub fn snapshot(
    source: &dyn FileSource,
    filter: &ExclusionFilter,
) -> Result<FileNode, FileSourceError> {
    let mut root = FileNode::root();
    let entries = source.list_children("")?;
    let mut pending = vec![(entries, String::new(), 0usize)];

    // Each stack frame holds the listed children of one directory; nodes are
    // attached by walking back down from the root via their path.
    while let Some((entries, dir, depth)) = pending.pop() {
        for entry in entries {
            let path = join_path(&dir, &entry.name);
            match entry.kind {
                EntryKind::File => {
                    if filter.excludes_file(&entry.name, &path) {
                        continue;
                    }
                    let mut node = FileNode::file(&path);
                    match source.stat_file(&path) {
                        Ok(stat) => {
                            node.size = Some(stat.size);
                            node.last_modified = stat.last_modified;
                        }
                        Err(err) => {
                            warn!(path = %path, error = %err, "failed to stat file");
                            node.error = Some(err.to_string());
                        }
                    }
                    attach(&mut root, &dir, node);
                }
                EntryKind::Directory => {
                    if filter.excludes_directory(&entry.name, &path) {
                        debug!(path = %path, "skipping excluded directory");
                        continue;
                    }
                    let mut node = FileNode::directory(&path);
                    if depth + 1 > filter.max_depth() {
                        debug!(path = %path, "max depth reached; not descending");
                        attach(&mut root, &dir, node);
                        continue;
                    }
                    match source.list_children(&path) {
                        Ok(children) => pending.push((children, path.clone(), depth + 1)),
                        Err(err) => {
                            warn!(path = %path, error = %err, "failed to list directory");
                            node.error = Some(err.to_string());
                        }
                    }
                    attach(&mut root, &dir, node);
                }
            }
        }
    }

    Ok(root)
}

fn attach(root: &mut FileNode, dir: &str, node: FileNode) {
    let mut parent = root;
    for part in dir.split('/').filter(|part| !part.is_empty()) {
        let Some(next) = parent.children.get_mut(part) else {
            return;
        };
        parent = next;
    }
    parent.insert_child(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSource;

    #[test]
    fn language_table_matches_extensions() {
        assert_eq!(language_for("a.ts"), "typescript");
        assert_eq!(language_for("App.TSX"), "tsx");
        assert_eq!(language_for("main.rs"), "rust");
        assert_eq!(language_for("Makefile"), "plaintext");
        assert_eq!(language_for("notes.txt"), "plaintext");
    }

    #[test]
    fn insert_file_creates_intermediate_directories() {
        let mut root = FileNode::root();
        root.insert_file("src/util/a.ts");
        root.insert_file("src/b.ts");

        let src = &root.children["src"];
        assert_eq!(src.kind, EntryKind::Directory);
        assert_eq!(src.path, "src");
        let names: Vec<&str> = src.children.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["util", "b.ts"]);
        assert_eq!(src.children["util"].children["a.ts"].path, "src/util/a.ts");
        assert_eq!(src.children["b.ts"].language, "typescript");
    }

    #[test]
    fn has_files_ignores_empty_directories() {
        let mut root = FileNode::root();
        root.insert_child(FileNode::directory("empty"));
        assert!(!root.has_files());
        root.insert_file("empty/x.md");
        assert!(root.has_files());
    }

    #[test]
    fn snapshot_preserves_source_order_and_stats() {
        let source = MemoryFileSource::new()
            .with_file("src/z.ts", "export const z = 1")
            .with_file("src/a.ts", "x")
            .with_file("README.md", "# hi");

        let filter = ExclusionFilter::new(&ExclusionConfig::default()).unwrap();
        let root = snapshot(&source, &filter).unwrap();

        let names: Vec<&str> = root.children.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["src", "README.md"]);
        let src_names: Vec<&str> = root.children["src"].children.keys().map(String::as_str).collect();
        assert_eq!(src_names, vec!["z.ts", "a.ts"]);
        assert_eq!(root.children["README.md"].size, Some(4));
    }

    #[test]
    fn snapshot_records_stat_failures_on_the_node() {
        let source = MemoryFileSource::new().with_file("a.ts", "x").with_unstatable("a.ts");
        let filter = ExclusionFilter::new(&ExclusionConfig::default()).unwrap();
        let root = snapshot(&source, &filter).unwrap();
        assert!(root.children["a.ts"].error.is_some());
    }
}
