//! Tracing subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CTXPACK_LOG";

/// Level used when neither [`LOG_ENV`] nor the caller sets one.
pub const DEFAULT_LEVEL: &str = "warn";

/// Initialize the global tracing subscriber with compact stderr output.
///
/// The filter comes from [`LOG_ENV`] when set and valid, otherwise from
/// `level`. Subsequent calls are no-ops.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails harmlessly if a global subscriber is already set.
    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init(DEFAULT_LEVEL);
        init("debug");
        tracing::debug!("still fine");
    }
}
