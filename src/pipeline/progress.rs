//! Pipeline states and request-scoped progress tracking.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ErrorKind, PipelineError};

/// Stage of one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Checking that the tree has any files.
    Validating,
    /// Flattening the tree to learn the file total.
    Counting,
    /// Loading content; `current` only ever increases.
    Loading {
        /// Loads completed so far, successful or not.
        current: usize,
        /// Files to load.
        total: usize,
    },
    /// Building dependencies and the architecture overview.
    Analyzing,
    /// Rendering the chosen output format.
    Serializing,
    /// Finished with an artifact.
    Done,
    /// Finished with an error.
    Failed {
        /// Classification of the failure.
        kind: ErrorKind,
    },
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::Counting => f.write_str("counting"),
            Self::Loading { current, total } => write!(f, "loading {current}/{total}"),
            Self::Analyzing => f.write_str("analyzing"),
            Self::Serializing => f.write_str("serializing"),
            Self::Done => f.write_str("done"),
            Self::Failed { kind } => write!(f, "failed ({kind:?})"),
        }
    }
}

/// Receives every state transition of a generation request.
pub trait ProgressObserver: Send + Sync {
    /// Called after the request identified by `request_id` enters `state`.
    fn on_transition(&self, request_id: Uuid, state: PipelineState);
}

/// Progress owned by exactly one in-flight request.
///
/// Nothing here is shared between requests; a request that is dropped takes
/// its progress with it.
pub(crate) struct RequestProgress<'a> {
    request_id: Uuid,
    state: PipelineState,
    observer: Option<&'a dyn ProgressObserver>,
}

impl<'a> RequestProgress<'a> {
    pub(crate) fn new(request_id: Uuid, observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self { request_id, state: PipelineState::Idle, observer }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn enter(&mut self, state: PipelineState) {
        debug!(request_id = %self.request_id, state = %state, "pipeline transition");
        self.state = state;
        if let Some(observer) = self.observer {
            observer.on_transition(self.request_id, state);
        }
    }

    /// Records one more completed load.
    pub(crate) fn advance(&mut self) {
        if let PipelineState::Loading { current, total } = self.state {
            self.enter(PipelineState::Loading { current: (current + 1).min(total), total });
        }
    }

    /// Moves to [`PipelineState::Failed`] and hands the error back.
    pub(crate) fn fail(&mut self, err: PipelineError) -> PipelineError {
        self.enter(PipelineState::Failed { kind: err.kind() });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log(Mutex<Vec<PipelineState>>);

    impl ProgressObserver for Log {
        fn on_transition(&self, _request_id: Uuid, state: PipelineState) {
            self.0.lock().unwrap().push(state);
        }
    }

    #[test]
    fn advance_only_counts_while_loading() {
        let log = Log::default();
        let mut progress = RequestProgress::new(Uuid::new_v4(), Some(&log));
        progress.advance();
        progress.enter(PipelineState::Loading { current: 0, total: 2 });
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(progress.state(), PipelineState::Loading { current: 2, total: 2 });
        let states = log.0.lock().unwrap().clone();
        assert_eq!(states.len(), 4);
        assert_eq!(states[1], PipelineState::Loading { current: 1, total: 2 });
    }

    #[test]
    fn fail_records_the_error_kind() {
        let mut progress = RequestProgress::new(Uuid::new_v4(), None);
        let err = progress.fail(PipelineError::Format("xml".into()));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(progress.state(), PipelineState::Failed { kind: ErrorKind::Format });
        assert_eq!(progress.state().to_string(), "failed (Format)");
    }
}
