//! Model-aware analysis instructions to send alongside an artifact.

use crate::render::OutputFormat;

/// Model used when none is configured.
pub const DEFAULT_TARGET_MODEL: &str = "gpt-4o";

/// Context window assumed for every supported model, in tokens.
pub const CONTEXT_WINDOW_TOKENS: usize = 128_000;

/// Models with a tailored instruction paragraph.
pub const SUPPORTED_MODELS: [&str; 6] =
    ["gpt-4o", "gpt-4.5", "o1", "o3-mini", "o3-mini-high", "gpt-4o-mini"];

/// Inputs to [`default_instructions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions<'a> {
    /// Target model name.
    pub model: &'a str,
    /// Format the artifact is rendered in.
    pub format: OutputFormat,
    /// Number of files in the artifact; zero when not yet known.
    pub file_count: usize,
    /// Whether the artifact includes metadata.
    pub include_metadata: bool,
    /// Whether file content was left untruncated.
    pub full_content: bool,
}

/// Returns the context window for `model`.
#[must_use]
pub fn context_window(_model: &str) -> usize {
    CONTEXT_WINDOW_TOKENS
}

/// Builds the default analysis instructions for an artifact.
///
/// Unknown models get the base prompt without a model-specific paragraph.
#[must_use]
pub fn default_instructions(options: &PromptOptions<'_>) -> String {
    let files_line = if options.file_count > 0 {
        format!("{} files from the codebase", options.file_count)
    } else {
        "Files from the codebase once loaded".to_string()
    };
    let content_kind = if options.full_content { "full content" } else { "truncated content" };
    let metadata_line = if options.include_metadata {
        "6. Metadata about languages, file sizes, and timestamps"
    } else {
        ""
    };

    let base = format!(
        "You are an AI assistant analyzing a codebase. The following context contains:

1. {files_line}
2. File structure and organization
3. Code content in {format} format ({content_kind})
4. Dependencies between files
5. Architecture overview
{metadata_line}

Please analyze this codebase context and provide:
- A summary of the overall architecture and structure
- Key components and their relationships
- Potential code quality issues or anti-patterns
- Suggestions for improvements in organization, performance, or maintainability
- Best practices that could be applied",
        format = options.format.display_name(),
    );

    match model_paragraph(options.model) {
        Some(paragraph) => format!("{base}\n\n{paragraph}"),
        None => base,
    }
}

fn model_paragraph(model: &str) -> Option<&'static str> {
    let paragraph = match model {
        "gpt-4o" => {
            "Focus on providing actionable insights that would help improve this codebase. \
             If you notice any security vulnerabilities or performance bottlenecks, highlight \
             those as priority items."
        }
        "gpt-4.5" => {
            "Provide a comprehensive analysis with special attention to architectural patterns \
             and code organization. Suggest modern best practices that could enhance \
             maintainability."
        }
        "o1" => {
            "Take your time to analyze the codebase thoroughly. Focus on identifying complex \
             issues and providing detailed, well-reasoned recommendations for improvements."
        }
        "o3-mini" | "o3-mini-high" => {
            "Provide a concise but thorough analysis focusing on the most critical aspects of \
             the codebase. Prioritize actionable recommendations."
        }
        "gpt-4o-mini" => {
            "Focus on providing a balanced overview of the codebase with practical, \
             implementable suggestions for improvement."
        }
        _ => return None,
    };
    Some(paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(model: &str) -> PromptOptions<'_> {
        PromptOptions {
            model,
            format: OutputFormat::Markdown,
            file_count: 12,
            include_metadata: true,
            full_content: false,
        }
    }

    #[test]
    fn base_prompt_reflects_options() {
        let text = default_instructions(&options("unknown-model"));
        assert!(text.contains("1. 12 files from the codebase"));
        assert!(text.contains("Code content in Markdown format (truncated content)"));
        assert!(text.contains("6. Metadata about languages"));
        assert!(text.ends_with("- Best practices that could be applied"));
    }

    #[test]
    fn known_models_append_a_paragraph() {
        for model in SUPPORTED_MODELS {
            let text = default_instructions(&options(model));
            assert!(!text.ends_with("applied"), "{model} should add a paragraph");
        }
        let text = default_instructions(&options("o3-mini-high"));
        assert!(text.ends_with("Prioritize actionable recommendations."));
    }

    #[test]
    fn zero_files_and_no_metadata() {
        let text = default_instructions(&PromptOptions {
            file_count: 0,
            include_metadata: false,
            full_content: true,
            ..options("gpt-4o")
        });
        assert!(text.contains("1. Files from the codebase once loaded"));
        assert!(text.contains("(full content)"));
        assert!(!text.contains("6. Metadata"));
    }

    #[test]
    fn every_model_shares_one_window() {
        assert_eq!(context_window("o1"), 128_000);
    }
}
