//! In-memory file source serving pre-loaded content.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::error::FileSourceError;
use crate::ports::{DirEntry, FileSource, FileStat, ReadFuture};

#[derive(Debug, Clone)]
enum MemoryEntry {
    File { content: String, last_modified: Option<DateTime<Utc>> },
    Directory(IndexMap<String, MemoryEntry>),
}

/// File source backed by content held in memory.
///
/// Entries keep insertion order. Individual paths can be marked unreadable or
/// unstatable to simulate per-file failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    root: IndexMap<String, MemoryEntry>,
    unreadable: HashMap<String, String>,
    unstatable: HashSet<String>,
    sizes: HashMap<String, u64>,
}

impl MemoryFileSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file at `path`, creating intermediate directories.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.insert_file(path, content.into());
        self
    }

    /// Adds an empty directory at `path`.
    #[must_use]
    pub fn with_directory(mut self, path: &str) -> Self {
        let _ = self.directory_mut(path.split('/').filter(|p| !p.is_empty()));
        self
    }

    /// Makes reads of `path` fail with `reason`.
    #[must_use]
    pub fn with_unreadable(mut self, path: &str, reason: impl Into<String>) -> Self {
        self.unreadable.insert(path.to_string(), reason.into());
        self
    }

    /// Makes stats of `path` fail.
    #[must_use]
    pub fn with_unstatable(mut self, path: &str) -> Self {
        self.unstatable.insert(path.to_string());
        self
    }

    /// Reports `size` bytes for `path` instead of its content length.
    #[must_use]
    pub fn with_reported_size(mut self, path: &str, size: u64) -> Self {
        self.sizes.insert(path.to_string(), size);
        self
    }

    /// Adds a file at `path`, creating intermediate directories.
    pub fn insert_file(&mut self, path: &str, content: String) {
        let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some(name) = parts.pop() else {
            return;
        };
        let dir = self.directory_mut(parts.into_iter());
        dir.insert(name.to_string(), MemoryEntry::File { content, last_modified: None });
    }

    fn directory_mut<'a>(
        &mut self,
        parts: impl Iterator<Item = &'a str>,
    ) -> &mut IndexMap<String, MemoryEntry> {
        let mut current = &mut self.root;
        for part in parts {
            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| MemoryEntry::Directory(IndexMap::new()));
            if !matches!(entry, MemoryEntry::Directory(_)) {
                *entry = MemoryEntry::Directory(IndexMap::new());
            }
            let MemoryEntry::Directory(children) = entry else {
                unreachable!("entry was just made a directory");
            };
            current = children;
        }
        current
    }

    fn lookup(&self, path: &str) -> Option<&MemoryEntry> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        let first = parts.next()?;
        let mut entry = self.root.get(first)?;
        for part in parts {
            match entry {
                MemoryEntry::Directory(children) => entry = children.get(part)?,
                MemoryEntry::File { .. } => return None,
            }
        }
        Some(entry)
    }

    fn file(&self, path: &str) -> Result<(&String, Option<DateTime<Utc>>), FileSourceError> {
        match self.lookup(path) {
            Some(MemoryEntry::File { content, last_modified }) => Ok((content, *last_modified)),
            _ => Err(FileSourceError::NotFound(path.to_string())),
        }
    }
}

impl FileSource for MemoryFileSource {
    fn list_children(&self, dir: &str) -> Result<Vec<DirEntry>, FileSourceError> {
        let children = if dir.is_empty() {
            &self.root
        } else {
            match self.lookup(dir) {
                Some(MemoryEntry::Directory(children)) => children,
                Some(MemoryEntry::File { .. }) => {
                    return Err(FileSourceError::NotADirectory(dir.to_string()))
                }
                None => return Err(FileSourceError::NotFound(dir.to_string())),
            }
        };
        Ok(children
            .iter()
            .map(|(name, entry)| match entry {
                MemoryEntry::File { .. } => DirEntry::file(name),
                MemoryEntry::Directory(_) => DirEntry::directory(name),
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> ReadFuture<'_> {
        let result = match self.unreadable.get(path) {
            Some(reason) => {
                Err(FileSourceError::Read { path: path.to_string(), reason: reason.clone() })
            }
            None => self.file(path).map(|(content, _)| content.clone()),
        };
        Box::pin(std::future::ready(result))
    }

    fn stat_file(&self, path: &str) -> Result<FileStat, FileSourceError> {
        if self.unstatable.contains(path) {
            return Err(FileSourceError::Read {
                path: path.to_string(),
                reason: "stat unavailable".to_string(),
            });
        }
        let (content, last_modified) = self.file(path)?;
        let size = self.sizes.get(path).copied().unwrap_or(content.len() as u64);
        Ok(FileStat { size, last_modified })
    }
}
