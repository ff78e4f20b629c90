//! Liquidation Preference Waterfall CLI
//!
//! Entry point for the `lpw` binary. Parses command-line arguments and
//! delegates to `waterfall_cli::run`.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use waterfall_cli::{init_logging, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&cli, &mut out) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            for (exit_value, message) in &summary.failures {
                eprintln!("Error at exit value {} cents: {}", exit_value, message);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
