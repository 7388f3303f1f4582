//! Service context bundling the port trait objects a command needs.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::{LiveClock, LiveFileSource};
use crate::adapters::recording::{RecordingClock, RecordingFileSource, SharedRecorder};
use crate::adapters::replaying::{ReplayingClock, ReplayingFileSource};
use crate::cassette::{self, CassetteRecorder, CassetteReplayer};
use crate::config::ContextConfig;
use crate::error::CassetteError;
use crate::ports::{Clock, FileSource};

/// Bundles the file source and clock used by one command.
///
/// Constructors wire up different adapter implementations (live, recording,
/// replaying). A recording context writes its cassette when dropped.
pub struct ServiceContext {
    /// Where directory listings and file contents come from.
    pub source: Box<dyn FileSource>,
    /// Clock for stamping artifacts.
    pub clock: Box<dyn Clock>,
    recorder: Option<SharedRecorder>,
    replayed_config: Option<ContextConfig>,
}

impl ServiceContext {
    /// Creates a live context reading the directory at `root`.
    #[must_use]
    pub fn live(root: &Path) -> Self {
        Self::with_source(Box::new(LiveFileSource::new(root)), Box::new(LiveClock))
    }

    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn with_source(source: Box<dyn FileSource>, clock: Box<dyn Clock>) -> Self {
        Self { source, clock, recorder: None, replayed_config: None }
    }

    /// Creates a live context that records every port call to `cassette`.
    ///
    /// The cassette is written when the context is dropped. This is what
    /// `CTXPACK_RECORD` turns on.
    #[must_use]
    pub fn recording(root: &Path, cassette: &Path) -> Self {
        let recorder: SharedRecorder = Arc::new(Mutex::new(CassetteRecorder::new(
            cassette,
            "ctxpack-session",
            root.display().to_string(),
        )));
        Self {
            source: Box::new(RecordingFileSource::new(
                Box::new(LiveFileSource::new(root)),
                Arc::clone(&recorder),
            )),
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&recorder))),
            recorder: Some(recorder),
            replayed_config: None,
        }
    }

    /// Creates a context that serves everything from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, CassetteError> {
        let cassette = cassette::load(path)?;
        info!(cassette = %path.display(), interactions = cassette.interactions.len(), "replaying");
        // Each port gets its own replayer so their queues are independent.
        let mut ctx = Self::with_source(
            Box::new(ReplayingFileSource::new(CassetteReplayer::new(&cassette))),
            Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette), cassette.recorded_at)),
        );
        ctx.replayed_config = cassette.config;
        Ok(ctx)
    }

    /// File-level configuration stored in the replayed cassette, if any.
    #[must_use]
    pub fn replayed_config(&self) -> Option<&ContextConfig> {
        self.replayed_config.as_ref()
    }

    /// Stores `config` in the cassette of a recording context.
    pub fn record_config(&self, config: &ContextConfig) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        match recorder.lock() {
            Ok(mut recorder) => recorder.set_config(config.clone()),
            Err(_) => warn!("recorder lock poisoned; config not recorded"),
        }
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let Ok(recorder) = recorder.lock() else {
            warn!("recorder lock poisoned; cassette not written");
            return;
        };
        match recorder.save() {
            Ok(path) => info!(cassette = %path.display(), interactions = recorder.len(), "cassette written"),
            Err(e) => warn!(error = %e, "failed to write cassette"),
        }
    }
}
