//! `ctxpack estimate` command.

use crate::cli::EstimateArgs;
use crate::context::ServiceContext;
use crate::pipeline::{estimate_tree, SizeEstimate};
use crate::tree::{snapshot, ExclusionFilter};

/// Execute the `estimate` command.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the root cannot be listed.
pub fn run(ctx: &ServiceContext, args: &EstimateArgs) -> Result<(), String> {
    let config = super::load_config(ctx, &args.tree)?;
    let filter = ExclusionFilter::new(&config.exclusion).map_err(|e| e.to_string())?;
    let root = snapshot(ctx.source.as_ref(), &filter)
        .map_err(|e| format!("cannot read {}: {e}", args.tree.root.display()))?;
    let model = args.target_model.as_deref().unwrap_or(&config.target_model);
    let estimate = estimate_tree(&root, &filter, model);
    println!("{}", render(&estimate, model));
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn render(estimate: &SizeEstimate, model: &str) -> String {
    let percent = estimate.estimated_tokens as f64 / estimate.context_window as f64 * 100.0;
    let mut out = format!(
        "Files: {}\nTotal size: {} bytes\nEstimated tokens: {} / {} ({percent:.1}% of {model})",
        estimate.files, estimate.total_size, estimate.estimated_tokens, estimate.context_window,
    );
    if estimate.over_limit() {
        out.push_str("\nWarning: estimated size exceeds the model's context window");
    }
    out
}
