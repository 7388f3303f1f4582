//! Markdown rendering: metadata, architecture, dependencies, then files.

use std::fmt::Write as _;

use super::{preview, ContextModel, Renderer};

/// Entries shown in the dependencies section.
pub const MAX_DEPENDENCY_ENTRIES: usize = 20;

/// Renders the model as a sectioned Markdown document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeRenderer;

impl Renderer for NarrativeRenderer {
    fn render(&self, model: &ContextModel<'_>) -> Result<String, serde_json::Error> {
        let mut out = String::from("# Codebase Context\n\n");

        if let Some(metadata) = model.metadata {
            out.push_str("## Metadata\n\n");
            let _ = writeln!(out, "- **Total Files:** {}", metadata.total_files);
            let _ = writeln!(out, "- **Languages:** {}", metadata.languages.join(", "));
            let _ = writeln!(out, "- **Generated:** {}\n", metadata.timestamp);
        }

        if let Some(architecture) = model.architecture.filter(|a| !a.is_empty()) {
            out.push_str(architecture);
            out.push_str("\n\n");
        }

        if let Some(dependencies) = model.dependencies {
            out.push_str("## Dependencies\n\n");
            let significant: Vec<_> = dependencies
                .iter()
                .filter(|(_, deps)| !deps.is_empty())
                .take(MAX_DEPENDENCY_ENTRIES)
                .collect();
            if significant.is_empty() {
                out.push_str("*No significant dependencies found*\n\n");
            }
            for (path, deps) in significant {
                let _ = writeln!(out, "### {path}\n");
                if !deps.imports.is_empty() {
                    out.push_str("**Imports:**\n");
                    for import in &deps.imports {
                        let _ = writeln!(out, "- `{import}`");
                    }
                    out.push('\n');
                }
                if !deps.used_by.is_empty() {
                    out.push_str("**Used by:**\n");
                    for user in &deps.used_by {
                        let _ = writeln!(out, "- `{user}`");
                    }
                    out.push('\n');
                }
            }
        }

        if !model.files.is_empty() {
            out.push_str("## Files\n\n");
            let mut sorted: Vec<_> = model.files.iter().collect();
            sorted.sort_by(|a, b| a.path.cmp(&b.path));
            for file in sorted {
                let language = if file.language.is_empty() { "text" } else { file.language.as_str() };
                let _ = writeln!(out, "### {}\n", file.path);
                let _ = writeln!(out, "**Language:** {language}");
                let _ = writeln!(out, "**Size:** {} characters\n", file.char_len());
                let (head, cut) = preview(&file.content);
                let _ = writeln!(out, "```{language}");
                out.push_str(head);
                out.push_str(if cut { "...\n" } else { "\n" });
                out.push_str("```\n\n");
            }
        }

        Ok(out)
    }
}
