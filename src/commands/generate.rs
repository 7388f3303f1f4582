//! `ctxpack generate` command.

use crate::adapters::live::{FilePresenter, StdoutPresenter};
use crate::cli::GenerateArgs;
use crate::context::ServiceContext;
use crate::error::PipelineError;
use crate::pipeline::{ContextArtifact, ContextPipeline, GenerateOptions};
use crate::ports::Presenter;
use crate::tree::{snapshot, ExclusionFilter};

/// Execute the `generate` command.
///
/// # Errors
///
/// Returns an error string if configuration is invalid, the root cannot be
/// listed, generation fails, or the artifact cannot be delivered. A budget
/// overflow is only an error without `--allow-partial`.
pub fn run(ctx: &ServiceContext, args: &GenerateArgs) -> Result<(), String> {
    let config = super::load_config(ctx, &args.tree)?;
    let filter = ExclusionFilter::new(&config.exclusion).map_err(|e| e.to_string())?;
    let root = snapshot(ctx.source.as_ref(), &filter)
        .map_err(|e| format!("cannot read {}: {e}", args.tree.root.display()))?;
    let options = options(config.generate_options(), args);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    let pipeline = ContextPipeline::new(ctx.source.as_ref(), ctx.clock.as_ref());
    let result = runtime.block_on(pipeline.generate(&root, &filter, &options));

    let artifact = match result {
        Ok(artifact) => artifact,
        Err(err @ PipelineError::BudgetExceeded { .. }) if args.allow_partial => {
            eprintln!("Warning: {err}; emitting truncated context");
            err.into_partial_artifact().ok_or("budget error without a partial artifact")?
        }
        Err(err @ PipelineError::BudgetExceeded { .. }) => {
            return Err(format!("{err}. Raise --max-tokens or pass --allow-partial."));
        }
        Err(err) => return Err(err.to_string()),
    };

    report_warnings(&artifact);
    present(&artifact, args)
}

fn options(mut options: GenerateOptions, args: &GenerateArgs) -> GenerateOptions {
    if let Some(format) = &args.format {
        options.format.clone_from(format);
    }
    if let Some(max_tokens) = args.max_tokens {
        options.max_tokens = usize::try_from(max_tokens).unwrap_or(usize::MAX);
    }
    if let Some(model) = &args.target_model {
        options.target_model.clone_from(model);
    }
    options.full_content |= args.full_content;
    options.minify |= args.minify;
    if args.no_metadata {
        options.include_metadata = false;
    }
    options
}

fn report_warnings(artifact: &ContextArtifact) {
    for warning in &artifact.warnings {
        eprintln!("Skipped {}: {}", warning.path, warning.reason);
    }
}

fn present(artifact: &ContextArtifact, args: &GenerateArgs) -> Result<(), String> {
    let delivered = match &args.output {
        Some(path) => {
            let presenter = FilePresenter::new(path);
            let destination = presenter.destination(artifact);
            presenter.present(artifact).map(|()| {
                eprintln!(
                    "Wrote {} files (~{} tokens) to {}",
                    artifact.files.len(),
                    artifact.estimated_tokens,
                    destination.display()
                );
            })
        }
        None => StdoutPresenter.present(artifact),
    };
    delivered.map_err(|e| format!("failed to deliver context: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["ctxpack", "generate"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Generate(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_configured_options() {
        let args = generate_args(&["--format", "plain", "--max-tokens", "500", "--no-metadata", "--minify"]);
        let merged = options(GenerateOptions::default(), &args);
        assert_eq!(merged.format, "plain");
        assert_eq!(merged.max_tokens, 500);
        assert!(!merged.include_metadata);
        assert!(merged.minify);
        assert_eq!(merged.target_model, "gpt-4o");
    }

    #[test]
    fn absent_flags_keep_configured_options() {
        let configured = GenerateOptions { full_content: true, ..GenerateOptions::default() };
        let merged = options(configured.clone(), &generate_args(&[]));
        assert_eq!(merged, configured);
    }

    #[test]
    fn writes_artifact_to_output_file() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.ts"), "x=1").unwrap();
        let out = root.path().join("out.json");
        let root_arg = root.path().to_str().unwrap();
        let out_arg = out.to_str().unwrap();
        let args = generate_args(&[root_arg, "--output", out_arg, "--exclude", "out.json"]);

        let ctx = ServiceContext::live(root.path());
        run(&ctx, &args).unwrap();

        let body: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(body["summary"]["totalFiles"], 1);
        assert_eq!(body["files"][0]["content"], "x=1");
    }

    #[test]
    fn budget_overflow_fails_without_allow_partial() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.ts"), "x".repeat(4_000)).unwrap();
        let root_arg = root.path().to_str().unwrap();
        let args = generate_args(&[root_arg, "--format", "plain", "--max-tokens", "100"]);

        let err = run(&ServiceContext::live(root.path()), &args).unwrap_err();
        assert!(err.contains("exceeds maximum token limit"));
        assert!(err.contains("--allow-partial"));
    }
}
