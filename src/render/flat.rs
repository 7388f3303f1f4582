//! Plain-text rendering with full file content.

use std::fmt::Write as _;

use super::{ContextModel, Renderer};

/// Renders the model as delimited plain text. File content is not previewed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRenderer;

impl Renderer for FlatRenderer {
    fn render(&self, model: &ContextModel<'_>) -> Result<String, serde_json::Error> {
        let mut out = String::from("Codebase Context\n\n");

        if let Some(metadata) = model.metadata {
            out.push_str("Metadata:\n");
            let _ = writeln!(out, "Total Files: {}", metadata.total_files);
            let _ = writeln!(out, "Total Size: {} characters", metadata.total_size);
            let _ = writeln!(out, "Languages: {}\n", metadata.languages.join(", "));
        }

        out.push_str("Files:\n\n");
        for file in model.files {
            let _ = write!(out, "--- {} ---\n\n{}\n\n", file.path, file.content);
        }

        if let Some(dependencies) = model.dependencies {
            out.push_str("Dependencies:\n\n");
            out.push_str(&serde_json::to_string_pretty(dependencies)?);
            out.push_str("\n\n");
        }

        if let Some(architecture) = model.architecture.filter(|a| !a.is_empty()) {
            out.push_str("Architecture:\n\n");
            out.push_str(architecture);
            out.push('\n');
        }

        Ok(out)
    }
}
