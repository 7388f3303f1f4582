//! Binary entrypoint for the `ctxpack` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    ctxpack::logging::init(ctxpack::logging::DEFAULT_LEVEL);

    // Recording is handled in commands::dispatch via CTXPACK_RECORD=<file>.
    match ctxpack::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
