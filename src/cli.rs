//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `ctxpack`.
#[derive(Debug, Parser)]
#[command(name = "ctxpack", version, about = "Pack a source tree into a token-bounded LLM context")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a context artifact for a directory.
    Generate(GenerateArgs),
    /// Estimate the context size of a directory without reading content.
    Estimate(EstimateArgs),
    /// Print the default analysis instructions for a model.
    Prompt(PromptArgs),
}

/// Options selecting and filtering the input tree.
#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Directory to pack.
    #[arg(default_value = ".")]
    pub root: PathBuf,
    /// Include dot-files and dot-directories.
    #[arg(long)]
    pub include_hidden: bool,
    /// Glob matched against names and paths to skip (repeatable).
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,
    /// Deepest directory level to visit.
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// Config file to use instead of `<ROOT>/.ctxpack.yaml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Serve the run from a recorded cassette instead of the filesystem.
    #[arg(long, value_name = "CASSETTE")]
    pub replay: Option<PathBuf>,
}

/// Arguments for `ctxpack generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Input tree selection.
    #[command(flatten)]
    pub tree: TreeArgs,
    /// Output format: json, markdown or plain.
    #[arg(long)]
    pub format: Option<String>,
    /// Token budget before the 10% safety margin.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_tokens: Option<u64>,
    /// Model the context is prepared for.
    #[arg(long)]
    pub target_model: Option<String>,
    /// Keep whole file contents instead of the first 5000 characters.
    #[arg(long)]
    pub full_content: bool,
    /// Emit compact JSON.
    #[arg(long)]
    pub minify: bool,
    /// Leave out the metadata section.
    #[arg(long)]
    pub no_metadata: bool,
    /// Write the artifact to this file (or directory) instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Emit the truncated artifact when the budget is exceeded.
    #[arg(long)]
    pub allow_partial: bool,
}

/// Arguments for `ctxpack estimate`.
#[derive(Debug, Clone, Args)]
pub struct EstimateArgs {
    /// Input tree selection.
    #[command(flatten)]
    pub tree: TreeArgs,
    /// Model whose context window is compared against.
    #[arg(long)]
    pub target_model: Option<String>,
}

/// Arguments for `ctxpack prompt`.
#[derive(Debug, Clone, Args)]
pub struct PromptArgs {
    /// Model the instructions are tailored to.
    #[arg(long, default_value = crate::prompt::DEFAULT_TARGET_MODEL)]
    pub target_model: String,
    /// Format the context is rendered in.
    #[arg(long, default_value = "json")]
    pub format: String,
    /// Number of files in the context.
    #[arg(long, default_value_t = 0)]
    pub files: usize,
    /// The context carries whole file contents.
    #[arg(long)]
    pub full_content: bool,
    /// The context has no metadata section.
    #[arg(long)]
    pub no_metadata: bool,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_generate_with_flags() {
        let cli = Cli::parse_from([
            "ctxpack", "generate", "app", "--format", "markdown", "--max-tokens", "1000",
            "--exclude", "*.lock", "--exclude", "fixtures", "--no-metadata", "--allow-partial",
        ]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.tree.root.to_str(), Some("app"));
        assert_eq!(args.format.as_deref(), Some("markdown"));
        assert_eq!(args.max_tokens, Some(1000));
        assert_eq!(args.tree.exclude, vec!["*.lock", "fixtures"]);
        assert!(args.no_metadata && args.allow_partial && !args.minify);
    }

    #[test]
    fn generate_root_defaults_to_current_directory() {
        let cli = Cli::parse_from(["ctxpack", "generate"]);
        assert!(matches!(cli.command, Command::Generate(ref a) if a.tree.root.to_str() == Some(".")));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        assert!(Cli::try_parse_from(["ctxpack", "generate", "--max-tokens", "0"]).is_err());
        assert!(Cli::try_parse_from(["ctxpack", "generate", "--max-tokens", "-5"]).is_err());
    }

    #[test]
    fn parses_prompt_defaults() {
        let cli = Cli::parse_from(["ctxpack", "prompt"]);
        let Command::Prompt(args) = cli.command else {
            panic!("expected prompt");
        };
        assert_eq!(args.target_model, "gpt-4o");
        assert_eq!(args.format, "json");
        assert_eq!(args.files, 0);
    }
}
