//! File source port: directory listing and file reads for the pipeline.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FileSourceError;

/// Boxed future returned by [`FileSource::read_file`], keeping the trait dyn-compatible.
pub type ReadFuture<'a> = Pin<Box<dyn Future<Output = Result<String, FileSourceError>> + Send + 'a>>;

/// Whether a directory entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory that may have children.
    Directory,
}

/// One entry returned by [`FileSource::list_children`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name within its parent directory.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
}

impl DirEntry {
    /// Creates a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::File }
    }

    /// Creates a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::Directory }
    }
}

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the source knows it.
    pub last_modified: Option<DateTime<Utc>>,
}

/// Provides directory listings and file contents to the pipeline.
///
/// Paths are root-relative and `/`-separated; `""` names the root directory.
/// The pipeline never assumes a transport: implementations may read a live
/// directory or serve pre-loaded content.
pub trait FileSource: Send + Sync {
    /// Lists the children of `dir` in the source's order.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` does not exist or is not a directory.
    fn list_children(&self, dir: &str) -> Result<Vec<DirEntry>, FileSourceError>;

    /// Reads the text content of the file at `path`.
    ///
    /// The returned future resolves to [`FileSourceError::NotFound`] or
    /// [`FileSourceError::Read`] when the file cannot be read as text.
    fn read_file(&self, path: &str) -> ReadFuture<'_>;

    /// Returns size and modification time of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be inspected.
    fn stat_file(&self, path: &str) -> Result<FileStat, FileSourceError>;
}

/// Joins a root-relative directory and a child name.
#[must_use]
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_handles_root() {
        assert_eq!(join_path("", "a.ts"), "a.ts");
        assert_eq!(join_path("src/util", "a.ts"), "src/util/a.ts");
    }
}
