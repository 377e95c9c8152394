//! Validates the codec against reference decode tables and against itself.
//!
//! ```text
//! minifloat-validate [REFERENCE_JSON] [--formats FILE]
//!                    [--exhaustive-bits N] [--samples N] [--threads N]
//! ```
//!
//! Exit status: 0 when every check passes, 1 on any mismatch, 2 on usage or
//! load errors.

use std::env;
use std::process::ExitCode;

use minifloat_codec::{CliArgs, EXIT_UNUSABLE, exit_code, run};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args = match CliArgs::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(EXIT_UNUSABLE);
        }
    };

    let outcome = run(&args);
    if let Ok(summary) = &outcome {
        println!("{summary}");
    }
    ExitCode::from(exit_code(&outcome))
}
