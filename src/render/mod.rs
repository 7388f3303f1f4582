//! Output renderers over an assembled context model.
//!
//! Three interchangeable [`Renderer`]s share one [`ContextModel`]. Every
//! optional section may be absent; renderers skip or default it rather than
//! fail.

pub mod flat;
pub mod narrative;
pub mod structured;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deps::DependencyRecord;
use crate::error::PipelineError;
use crate::loader::LoadedFile;

pub use flat::FlatRenderer;
pub use narrative::NarrativeRenderer;
pub use structured::StructuredRenderer;

/// Characters of file content shown in structured and narrative previews.
pub const PREVIEW_CHARS: usize = 500;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON document with previews of file content.
    #[serde(alias = "structured")]
    Json,
    /// Markdown document with sectioned headings.
    #[serde(alias = "md", alias = "narrative")]
    Markdown,
    /// Plain text with full file content.
    #[serde(alias = "text", alias = "flat")]
    Plain,
}

impl OutputFormat {
    /// Canonical name, as accepted on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Plain => "plain",
        }
    }

    /// File extension for artifacts in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Plain => "txt",
        }
    }

    /// Display name used in prompts.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
            Self::Plain => "Plain Text",
        }
    }

    /// Returns the renderer for this format.
    #[must_use]
    pub fn renderer(self, minify: bool) -> Box<dyn Renderer> {
        match self {
            Self::Json => Box::new(StructuredRenderer { minify }),
            Self::Markdown => Box::new(NarrativeRenderer),
            Self::Plain => Box::new(FlatRenderer),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(Self::Json),
            "markdown" | "md" | "narrative" => Ok(Self::Markdown),
            "plain" | "text" | "txt" | "flat" => Ok(Self::Plain),
            _ => Err(PipelineError::Format(s.to_string())),
        }
    }
}

/// Descriptive metadata about a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Number of loaded files.
    pub total_files: usize,
    /// Sum of loaded content lengths in characters.
    pub total_size: usize,
    /// Distinct languages in first-seen order.
    pub languages: Vec<String>,
    /// RFC 3339 generation time.
    pub timestamp: String,
    /// Model the artifact is prepared for.
    pub target_model: String,
}

/// Everything a renderer needs, borrowed from the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ContextModel<'a> {
    /// Loaded files in traversal order.
    pub files: &'a [LoadedFile],
    /// Metadata, when requested.
    pub metadata: Option<&'a Metadata>,
    /// Dependency graph, when computed.
    pub dependencies: Option<&'a DependencyRecord>,
    /// Architecture overview, when computed.
    pub architecture: Option<&'a str>,
}

impl<'a> ContextModel<'a> {
    /// A model with files only.
    #[must_use]
    pub fn files_only(files: &'a [LoadedFile]) -> Self {
        Self { files, metadata: None, dependencies: None, architecture: None }
    }
}

/// Renders a [`ContextModel`] to text.
pub trait Renderer: Send + Sync {
    /// Renders `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded JSON section cannot be serialized.
    fn render(&self, model: &ContextModel<'_>) -> Result<String, serde_json::Error>;
}

/// Splits `content` into its first [`PREVIEW_CHARS`] characters and whether
/// anything was cut.
#[must_use]
pub fn preview(content: &str) -> (&str, bool) {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => (&content[..cut], true),
        None => (content, false),
    }
}

/// Returns the preview of `content` with `...` appended when it was cut.
#[must_use]
pub fn preview_text(content: &str) -> String {
    match preview(content) {
        (head, true) => format!("{head}..."),
        (head, false) => head.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_and_aliases_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("narrative".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported format: xml");
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        let text = "ü".repeat(PREVIEW_CHARS + 1);
        let (head, cut) = preview(&text);
        assert!(cut);
        assert_eq!(head.chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), ("short", false));
    }
}
