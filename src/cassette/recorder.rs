//! Records interactions into a cassette file.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format::{Cassette, Interaction};
use crate::config::ContextConfig;
use crate::error::CassetteError;

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    root: String,
    config: Option<ContextConfig>,
    interactions: Vec<Interaction>,
    next_seq: u64,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            root: root.into(),
            config: None,
            interactions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Path the cassette is written to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Interactions recorded so far, in order.
    #[must_use]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Stores the file-level configuration the session runs with.
    pub fn set_config(&mut self, config: ContextConfig) {
        self.config = Some(config);
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        self.interactions.push(Interaction {
            seq: self.next_seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
        self.next_seq += 1;
    }

    /// Writes everything recorded so far to the cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be serialized or written.
    pub fn save(&self) -> Result<&Path, CassetteError> {
        let cassette = Cassette {
            name: self.name.clone(),
            recorded_at: Utc::now(),
            root: self.root.clone(),
            config: self.config.clone(),
            interactions: self.interactions.clone(),
        };
        let yaml = serde_yaml::to_string(&cassette)?;
        std::fs::write(&self.path, yaml)
            .map_err(|source| CassetteError::Io { path: self.path.display().to_string(), source })?;
        Ok(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "test-recording", "/work/app");
        recorder.record("source", "list_children", json!({"path": ""}), json!({"ok": []}));
        recorder.record("source", "read_file", json!({"path": "a.ts"}), json!({"ok": "x=1"}));
        recorder.record("clock", "now", json!(null), json!("2024-01-01T00:00:00Z"));
        assert_eq!(recorder.len(), 3);

        let written = recorder.save().expect("save should succeed");
        assert_eq!(written, path);

        let cassette = crate::cassette::load(&path).unwrap();
        assert_eq!(cassette.name, "test-recording");
        assert_eq!(cassette.root, "/work/app");
        let seqs: Vec<u64> = cassette.interactions.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(cassette.interactions[2].port, "clock");
        assert_eq!(cassette.config, None);
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.cassette.yaml");
        let config = ContextConfig { format: "plain".into(), minify: true, ..ContextConfig::default() };

        let mut recorder = CassetteRecorder::new(&path, "with-config", "/work/app");
        recorder.set_config(config.clone());
        recorder.save().unwrap();

        assert_eq!(crate::cassette::load(&path).unwrap().config, Some(config));
    }
}
