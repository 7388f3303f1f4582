//! Replaying adapter for the `FileSource` port.

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::adapters::recording::file_source::PathInput;
use crate::cassette::{value_to_result, CassetteReplayer};
use crate::error::FileSourceError;
use crate::ports::{DirEntry, FileSource, FileStat, ReadFuture};

/// Replays recorded file source calls from a cassette.
///
/// A call missing from the cassette surfaces as a [`FileSourceError::Read`],
/// so a stale cassette degrades like an unreadable file instead of aborting.
pub struct ReplayingFileSource {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSource {
    /// Creates a new replaying source from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay<T: DeserializeOwned>(&self, method: &str, path: &str) -> Result<T, FileSourceError> {
        let unreplayable =
            |reason: String| FileSourceError::Read { path: path.to_string(), reason };
        let input = serde_json::to_value(PathInput { path }).map_err(|e| unreplayable(e.to_string()))?;
        let output = {
            let mut replayer =
                self.replayer.lock().map_err(|_| unreplayable("replayer lock poisoned".to_string()))?;
            replayer.next_interaction("source", method, &input).map_err(|e| unreplayable(e.to_string()))?.output
        };
        value_to_result(&output, &format!("source::{method}")).map_err(|e| unreplayable(e.to_string()))?
    }
}

impl FileSource for ReplayingFileSource {
    fn list_children(&self, dir: &str) -> Result<Vec<DirEntry>, FileSourceError> {
        self.replay("list_children", dir)
    }

    fn read_file(&self, path: &str) -> ReadFuture<'_> {
        Box::pin(std::future::ready(self.replay("read_file", path)))
    }

    fn stat_file(&self, path: &str) -> Result<FileStat, FileSourceError> {
        self.replay("stat_file", path)
    }
}
