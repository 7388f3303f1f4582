//! Presenter port: where finished artifacts are delivered.

use crate::pipeline::ContextArtifact;

/// Receives a finished (or explicitly accepted partial) artifact.
///
/// Delivery (stdout, a file, a clipboard) is outside the pipeline; the
/// presenter only decides where the serialized body goes.
pub trait Presenter {
    /// Delivers the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be delivered.
    fn present(&self, artifact: &ContextArtifact) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
