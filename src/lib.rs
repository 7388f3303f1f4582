//! Core library entry for the `ctxpack` CLI.
//!
//! `ctxpack` walks a source tree, loads file contents concurrently,
//! extracts a JS/TS dependency graph, summarizes the architecture and
//! renders everything into a token-bounded context artifact.

pub mod adapters;
pub mod architecture;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod deps;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod ports;
pub mod prompt;
pub mod render;
pub mod tokens;
pub mod tree;

pub use error::{ErrorKind, FileSourceError, LoadError, PipelineError};
pub use pipeline::{ContextArtifact, ContextPipeline, GenerateOptions};
pub use render::OutputFormat;
pub use tree::{ExclusionConfig, ExclusionFilter, FileNode};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_prints_prompt() {
        let result = run(["ctxpack", "prompt", "--target-model", "o1"]);
        assert!(result.is_ok());
    }

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["ctxpack", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_root() {
        let err = run(["ctxpack", "estimate", "/definitely/not/a/dir"]).unwrap_err();
        assert!(err.starts_with("not a directory"));
    }
}
