//! Error types shared across the context pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::ContextArtifact;

/// Errors raised by a [`FileSource`](crate::ports::FileSource).
///
/// Serializable so recorded sessions replay the exact failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSourceError {
    /// The requested path does not exist in the source.
    #[error("not found: {0}")]
    NotFound(String),

    /// The path exists but could not be read or decoded.
    #[error("failed to read {path}: {reason}")]
    Read {
        /// Root-relative path that failed.
        path: String,
        /// Human-readable cause.
        reason: String,
    },

    /// A directory listing was requested for something that is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

/// Reasons a single file is skipped by the content loader.
///
/// These never abort a generation; they are logged and reported as warnings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The file source failed to stat or read the file.
    #[error(transparent)]
    Source(#[from] FileSourceError),

    /// The tree snapshot already recorded a failure for this node.
    #[error("{0}")]
    Snapshot(String),
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input tree is empty or nothing in it could be read.
    Validation,
    /// The requested output format is unknown.
    Format,
    /// The rendered output exceeds the effective token budget.
    BudgetExceeded,
    /// Rendering the structured output failed.
    Render,
}

/// Pipeline-level failures. Per-file failures never reach this type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No files in the input, or zero files could be loaded.
    #[error("{0}")]
    Validation(String),

    /// The caller asked for an output format that does not exist.
    #[error("unsupported format: {0}")]
    Format(String),

    /// The rendered artifact is over budget. A degraded artifact that fits is attached.
    #[error("generated context exceeds maximum token limit ({estimated} > {budget})")]
    BudgetExceeded {
        /// Estimated tokens of the full rendering.
        estimated: usize,
        /// Effective budget the rendering was checked against.
        budget: usize,
        /// Truncated artifact that fits the effective budget.
        partial: Box<ContextArtifact>,
    },

    /// Structured rendering failed.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl PipelineError {
    /// Returns the error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Format(_) => ErrorKind::Format,
            Self::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Self::Render(_) => ErrorKind::Render,
        }
    }

    /// Returns the degraded artifact carried by a budget failure, if any.
    #[must_use]
    pub fn partial_artifact(&self) -> Option<&ContextArtifact> {
        match self {
            Self::BudgetExceeded { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consumes the error, returning the degraded artifact if any.
    #[must_use]
    pub fn into_partial_artifact(self) -> Option<ContextArtifact> {
        match self {
            Self::BudgetExceeded { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the config file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`ContextConfig`](crate::config::ContextConfig).
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Environment variable name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// An exclusion glob failed to compile.
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    Pattern {
        /// The glob as written.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: globset::Error,
    },
}

/// Errors raised while reading, writing or replaying a cassette.
#[derive(Error, Debug)]
pub enum CassetteError {
    /// The cassette file could not be read or written.
    #[error("cassette I/O failed for {path}: {source}")]
    Io {
        /// Path of the cassette file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The cassette is not valid YAML.
    #[error("failed to parse cassette {path}: {source}")]
    Parse {
        /// Path of the cassette file.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The cassette could not be serialized.
    #[error("failed to serialize cassette: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// No recorded interaction is left for a call.
    #[error("no recorded interaction left for {port}::{method} with input {input}")]
    Unrecorded {
        /// Port name.
        port: String,
        /// Method name.
        method: String,
        /// Call input as JSON.
        input: String,
    },

    /// A recorded output does not have the expected shape.
    #[error("malformed recording for {context}: {reason}")]
    Malformed {
        /// `port::method` of the interaction.
        context: String,
        /// What was wrong.
        reason: String,
    },
}
