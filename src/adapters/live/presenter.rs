//! Presenters that deliver artifact bodies to stdout or a file.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::pipeline::ContextArtifact;
use crate::ports::Presenter;

type PresentResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Writes the artifact body to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn present(&self, artifact: &ContextArtifact) -> PresentResult {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(artifact.body.as_bytes())?;
        if !artifact.body.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

/// Writes the artifact body to a file.
///
/// When the target is an existing directory, the artifact's suggested file
/// name is used inside it.
#[derive(Debug, Clone)]
pub struct FilePresenter {
    target: PathBuf,
}

impl FilePresenter {
    /// Creates a presenter writing to `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self { target: target.into() }
    }

    /// Resolves the path an artifact would be written to.
    #[must_use]
    pub fn destination(&self, artifact: &ContextArtifact) -> PathBuf {
        if self.target.is_dir() {
            self.target.join(&artifact.suggested_file_name)
        } else {
            self.target.clone()
        }
    }
}

impl Presenter for FilePresenter {
    fn present(&self, artifact: &ContextArtifact) -> PresentResult {
        let path = self.destination(artifact);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &artifact.body)?;
        info!(path = %path.display(), bytes = artifact.body.len(), "artifact written");
        Ok(())
    }
}
