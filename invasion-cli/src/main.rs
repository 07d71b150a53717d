//! Entry point of the `invasion` binary.
//!
//! Parses the arguments, runs the simulation and prints the report to
//! stdout, one destruction line at a time. Logging is initialised first so
//! every later step can emit diagnostics through `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use invasion_cli::{
    cli::{Cli, CliError, render_remaining_world, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let outcome = run_cli(cli, &mut writer).context("invasion failed")?;
    render_remaining_world(&outcome.world, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = err
            .downcast_ref::<CliError>()
            .and_then(CliError::code)
            .map(field::display);
        let message = format!("{err:#}");
        error!(error = message.as_str(), code, "command execution failed");
        report_failure(&err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}

#[expect(
    clippy::print_stderr,
    reason = "Failures must reach the user whatever RUST_LOG filters out"
)]
fn report_failure(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
}
