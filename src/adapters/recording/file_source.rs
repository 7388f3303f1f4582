//! Recording adapter for the `FileSource` port.

use serde::Serialize;

use super::{record_result, SharedRecorder};
use crate::error::FileSourceError;
use crate::ports::{DirEntry, FileSource, FileStat, ReadFuture};

/// Records file source interactions while delegating to an inner implementation.
pub struct RecordingFileSource {
    inner: Box<dyn FileSource>,
    recorder: SharedRecorder,
}

impl RecordingFileSource {
    /// Creates a new recording source wrapping the given implementation.
    pub fn new(inner: Box<dyn FileSource>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

/// Input recorded for every file source call.
#[derive(Serialize)]
pub(crate) struct PathInput<'a> {
    pub(crate) path: &'a str,
}

impl FileSource for RecordingFileSource {
    fn list_children(&self, dir: &str) -> Result<Vec<DirEntry>, FileSourceError> {
        let result = self.inner.list_children(dir);
        record_result(&self.recorder, "source", "list_children", &PathInput { path: dir }, &result);
        result
    }

    fn read_file(&self, path: &str) -> ReadFuture<'_> {
        let path = path.to_string();
        Box::pin(async move {
            let result = self.inner.read_file(&path).await;
            record_result(&self.recorder, "source", "read_file", &PathInput { path: &path }, &result);
            result
        })
    }

    fn stat_file(&self, path: &str) -> Result<FileStat, FileSourceError> {
        let result = self.inner.stat_file(path);
        record_result(&self.recorder, "source", "stat_file", &PathInput { path }, &result);
        result
    }
}
