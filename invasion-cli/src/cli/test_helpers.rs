//! Small helpers shared across CLI tests.
//!
//! The tests write maps into temporary directories and drive [`run_cli`]
//! directly; these helpers keep each case short.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use invasion_core::InvasionOutcome;
use tempfile::TempDir;

use super::{Cli, CliError, PruningArg, render_remaining_world, run_cli};

pub(super) const SAMPLE_MAP: &str = "Foo north=Bar west=Baz south=Qu-ux\nBar south=Foo west=Bee\n";

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_map_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

pub(super) fn cli_for(map: PathBuf, aliens: usize) -> Cli {
    Cli {
        aliens,
        map,
        seed: Some(7),
        max_rounds: 100,
        pruning: PruningArg::Reciprocal,
    }
}

/// Runs `cli` and returns the outcome with the full report text, streamed
/// events first.
pub(super) fn run_to_report(cli: Cli) -> Result<(InvasionOutcome, String), CliError> {
    let mut buffer = Vec::new();
    let outcome = run_cli(cli, &mut buffer)?;
    if let Err(err) = render_remaining_world(&outcome.world, &mut buffer) {
        panic!("rendering into memory must succeed: {err}");
    }
    match String::from_utf8(buffer) {
        Ok(text) => Ok((outcome, text)),
        Err(err) => panic!("report must be UTF-8: {err}"),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli, io::sink()) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

/// Writer that keeps a copy of its contents at every flush.
#[derive(Default)]
pub(super) struct FlushLog {
    pending: Vec<u8>,
    pub(super) flushed: Vec<String>,
}

impl Write for FlushLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushed
            .push(String::from_utf8_lossy(&self.pending).into_owned());
        Ok(())
    }
}

/// Writer whose every write fails.
pub(super) struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
