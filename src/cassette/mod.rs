//! Cassette format for recording and replaying port interactions.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;

use std::path::Path;

use crate::error::CassetteError;

/// Reads and parses a cassette file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid cassette.
pub fn load(path: &Path) -> Result<Cassette, CassetteError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| CassetteError::Io { path: path.display().to_string(), source })?;
    serde_yaml::from_str(&content)
        .map_err(|source| CassetteError::Parse { path: path.display().to_string(), source })
}

/// Builds the stored output for a fallible call: `{"ok": v}` or `{"err": e}`.
pub(crate) fn result_to_value<T, E>(result: &Result<T, E>) -> serde_json::Value
where
    T: serde::Serialize,
    E: serde::Serialize,
{
    let (key, value) = match result {
        Ok(v) => ("ok", serde_json::to_value(v)),
        Err(e) => ("err", serde_json::to_value(e)),
    };
    let value = value.unwrap_or_else(|e| serde_json::Value::String(e.to_string()));
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), value);
    serde_json::Value::Object(map)
}

/// Inverse of [`result_to_value`].
///
/// # Errors
///
/// Returns [`CassetteError::Malformed`] if `output` has neither key or the
/// payload does not deserialize.
pub(crate) fn value_to_result<T, E>(
    output: &serde_json::Value,
    context: &str,
) -> Result<Result<T, E>, CassetteError>
where
    T: serde::de::DeserializeOwned,
    E: serde::de::DeserializeOwned,
{
    let malformed = |reason: String| CassetteError::Malformed { context: context.to_string(), reason };
    if let Some(err) = output.get("err") {
        return serde_json::from_value(err.clone()).map(Err).map_err(|e| malformed(e.to_string()));
    }
    match output.get("ok") {
        Some(ok) => serde_json::from_value(ok.clone()).map(Ok).map_err(|e| malformed(e.to_string())),
        None => Err(malformed("expected an \"ok\" or \"err\" key".to_string())),
    }
}
