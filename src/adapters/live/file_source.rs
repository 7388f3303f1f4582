//! Live file source reading a directory on disk.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::FileSourceError;
use crate::ports::{DirEntry, FileSource, FileStat, ReadFuture};

/// File source rooted at a directory on disk.
///
/// Listings are sorted by name so snapshots are reproducible across
/// platforms. Symbolic links are followed. Entries whose target cannot be
/// inspected, such as dangling links, are listed as files so the failure
/// shows up when they are stat'ed or read.
#[derive(Debug, Clone)]
pub struct LiveFileSource {
    root: PathBuf,
}

impl LiveFileSource {
    /// Creates a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this source reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/').filter(|part| !part.is_empty()).fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

fn io_error(path: &str, err: &io::Error) -> FileSourceError {
    match err.kind() {
        io::ErrorKind::NotFound => FileSourceError::NotFound(path.to_string()),
        _ => FileSourceError::Read { path: path.to_string(), reason: err.to_string() },
    }
}

impl FileSource for LiveFileSource {
    fn list_children(&self, dir: &str) -> Result<Vec<DirEntry>, FileSourceError> {
        let full = self.resolve(dir);
        let metadata = std::fs::metadata(&full).map_err(|e| io_error(dir, &e))?;
        if !metadata.is_dir() {
            return Err(FileSourceError::NotADirectory(dir.to_string()));
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&full).map_err(|e| io_error(dir, &e))? {
            let entry = entry.map_err(|e| io_error(dir, &e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().map(str::to_string) else {
                warn!(dir, name = %file_name.to_string_lossy(), "skipping entry with a non-UTF-8 name");
                continue;
            };
            // `metadata` follows symlinks, unlike `DirEntry::file_type`.
            match std::fs::metadata(entry.path()) {
                Ok(meta) if meta.is_dir() => entries.push(DirEntry::directory(name)),
                Ok(meta) if meta.is_file() => entries.push(DirEntry::file(name)),
                Ok(_) => debug!(dir, name = %name, "skipping special file"),
                Err(err) => {
                    debug!(dir, name = %name, error = %err, "entry cannot be inspected");
                    entries.push(DirEntry::file(name));
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> ReadFuture<'_> {
        let full = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let bytes = tokio::fs::read(&full).await.map_err(|e| io_error(&path, &e))?;
            String::from_utf8(bytes).map_err(|_| FileSourceError::Read {
                path,
                reason: "content is not valid UTF-8".to_string(),
            })
        })
    }

    fn stat_file(&self, path: &str) -> Result<FileStat, FileSourceError> {
        let metadata = std::fs::metadata(self.resolve(path)).map_err(|e| io_error(path, &e))?;
        Ok(FileStat {
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::EntryKind;

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/lib")).unwrap();
        std::fs::write(dir.path().join("src/lib/a.ts"), "export const a = 1;").unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();
        dir
    }

    #[test]
    fn lists_sorted_children() {
        let dir = sample_dir();
        let source = LiveFileSource::new(dir.path());
        let root = source.list_children("").unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README.md", "blob.bin", "src"]);
        assert_eq!(root[2].kind, EntryKind::Directory);
        assert_eq!(source.list_children("src/lib").unwrap(), vec![DirEntry::file("a.ts")]);
    }

    #[test]
    fn listing_errors_are_classified() {
        let dir = sample_dir();
        let source = LiveFileSource::new(dir.path());
        assert_eq!(source.list_children("nope"), Err(FileSourceError::NotFound("nope".into())));
        assert_eq!(
            source.list_children("README.md"),
            Err(FileSourceError::NotADirectory("README.md".into()))
        );
    }

    #[tokio::test]
    async fn reads_text_and_rejects_invalid_utf8() {
        let dir = sample_dir();
        let source = LiveFileSource::new(dir.path());
        assert_eq!(source.read_file("src/lib/a.ts").await.unwrap(), "export const a = 1;");
        assert!(matches!(source.read_file("blob.bin").await, Err(FileSourceError::Read { .. })));
        assert!(matches!(source.read_file("gone.ts").await, Err(FileSourceError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_links_are_listed_and_fail_to_stat() {
        let dir = sample_dir();
        std::os::unix::fs::symlink(dir.path().join("missing.ts"), dir.path().join("b.ts")).unwrap();
        let source = LiveFileSource::new(dir.path());

        let root = source.list_children("").unwrap();
        assert!(root.contains(&DirEntry::file("b.ts")));
        assert_eq!(source.stat_file("b.ts"), Err(FileSourceError::NotFound("b.ts".into())));
    }

    #[test]
    fn stat_reports_size_and_mtime() {
        let dir = sample_dir();
        let stat = LiveFileSource::new(dir.path()).stat_file("README.md").unwrap();
        assert_eq!(stat.size, 4);
        assert!(stat.last_modified.is_some());
    }
}
