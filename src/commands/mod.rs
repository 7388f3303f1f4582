//! Command dispatch and handlers.

pub mod estimate;
pub mod generate;
pub mod prompt;

use std::env;
use std::path::Path;

use crate::cli::{Command, TreeArgs};
use crate::config::ContextConfig;
use crate::context::ServiceContext;

/// Environment variable naming a cassette file to record the run into.
pub const RECORD_ENV: &str = "CTXPACK_RECORD";

/// Dispatch a parsed command to its handler.
///
/// When `CTXPACK_RECORD` is set to a file path, every file source and clock
/// interaction of a tree command is recorded to that cassette.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Generate(args) => {
            let ctx = service_context(&args.tree)?;
            generate::run(&ctx, args)
        }
        Command::Estimate(args) => {
            let ctx = service_context(&args.tree)?;
            estimate::run(&ctx, args)
        }
        Command::Prompt(args) => prompt::run(args),
    }
}

/// Builds the service context for a command reading `tree.root`.
fn service_context(tree: &TreeArgs) -> Result<ServiceContext, String> {
    if let Some(cassette) = &tree.replay {
        return ServiceContext::replaying(cassette).map_err(|e| e.to_string());
    }
    if !tree.root.is_dir() {
        return Err(format!("not a directory: {}", tree.root.display()));
    }
    match env::var(RECORD_ENV) {
        Ok(path) if !path.is_empty() => {
            eprintln!("Recording to: {path}");
            Ok(ServiceContext::recording(&tree.root, Path::new(&path)))
        }
        _ => Ok(ServiceContext::live(&tree.root)),
    }
}

/// Loads configuration for `tree` and applies its exclusion flags.
///
/// The file layer comes from `--config`, else the replayed cassette, else
/// `.ctxpack.yaml` in the root. A recording context stores that layer before
/// environment and flag overrides are applied on top.
pub(crate) fn load_config(ctx: &ServiceContext, tree: &TreeArgs) -> Result<ContextConfig, String> {
    let mut config = match (tree.config.as_deref(), ctx.replayed_config()) {
        (None, Some(recorded)) => recorded.clone(),
        (explicit, _) => {
            let root = tree.replay.is_none().then_some(tree.root.as_path());
            ContextConfig::discover(root, explicit).map_err(|e| e.to_string())?
        }
    };
    ctx.record_config(&config);
    config.apply_process_env().map_err(|e| e.to_string())?;
    if tree.include_hidden {
        config.exclusion.include_hidden = true;
    }
    config.exclusion.excluded_patterns.extend(tree.exclude.iter().cloned());
    if let Some(depth) = tree.max_depth {
        config.exclusion.max_depth = depth;
    }
    Ok(config)
}
