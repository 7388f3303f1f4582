//! `ctxpack prompt` command.

use crate::cli::PromptArgs;
use crate::prompt::{default_instructions, PromptOptions};
use crate::render::OutputFormat;

/// Execute the `prompt` command.
///
/// # Errors
///
/// Returns an error string if the format is unknown.
pub fn run(args: &PromptArgs) -> Result<(), String> {
    println!("{}", instructions(args)?);
    Ok(())
}

fn instructions(args: &PromptArgs) -> Result<String, String> {
    let format: OutputFormat = args.format.parse().map_err(|e: crate::error::PipelineError| e.to_string())?;
    Ok(default_instructions(&PromptOptions {
        model: &args.target_model,
        format,
        file_count: args.files,
        include_metadata: !args.no_metadata,
        full_content: args.full_content,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: &str) -> PromptArgs {
        PromptArgs {
            target_model: "o1".into(),
            format: format.into(),
            files: 3,
            full_content: false,
            no_metadata: true,
        }
    }

    #[test]
    fn builds_instructions_from_flags() {
        let text = instructions(&args("plain")).unwrap();
        assert!(text.contains("1. 3 files from the codebase"));
        assert!(text.contains("Plain Text format"));
        assert!(text.contains("Take your time"));
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert_eq!(instructions(&args("xml")).unwrap_err(), "unsupported format: xml");
    }
}
