//! Recording adapters that capture interactions to cassettes.

pub mod clock;
pub mod file_source;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::cassette::{result_to_value, CassetteRecorder};

pub use clock::RecordingClock;
pub use file_source::RecordingFileSource;

/// Recorder shared by every recording adapter of one session.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Record an interaction with a plain (non-`Result`) return value.
pub(crate) fn record_interaction<I, O>(recorder: &SharedRecorder, port: &str, method: &str, input: &I, output: &O)
where
    I: Serialize,
    O: Serialize,
{
    match (serde_json::to_value(input), serde_json::to_value(output)) {
        (Ok(input), Ok(output)) => push(recorder, port, method, input, output),
        (Err(e), _) | (_, Err(e)) => warn!(port, method, error = %e, "interaction not recorded"),
    }
}

/// Record a `Result<T, E>` interaction using the `{"ok": ..}` / `{"err": ..}` convention.
pub(crate) fn record_result<T, E, I>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: Serialize,
    I: Serialize,
{
    match serde_json::to_value(input) {
        Ok(input) => push(recorder, port, method, input, result_to_value(result)),
        Err(e) => warn!(port, method, error = %e, "interaction not recorded"),
    }
}

fn push(recorder: &SharedRecorder, port: &str, method: &str, input: serde_json::Value, output: serde_json::Value) {
    match recorder.lock() {
        Ok(mut guard) => guard.record(port, method, input, output),
        Err(_) => warn!(port, method, "recorder lock poisoned; interaction dropped"),
    }
}
