//! Support library for the `invasion` binary.
//!
//! Exposes argument parsing, the simulation driver and the report renderer so
//! tests can exercise the command without spawning a subprocess.

pub mod cli;
pub mod logging;
