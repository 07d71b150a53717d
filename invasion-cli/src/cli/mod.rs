//! Command-line interface for the invasion simulation.
//!
//! A single command loads a world map, lands the requested number of aliens,
//! reports each destroyed city as it falls and renders what is left of the
//! world once the invasion halts.

mod commands;

pub use commands::{
    Cli, CliError, DEFAULT_MAP_PATH, PruningArg, render_remaining_world, run_cli,
};

#[cfg(test)]
mod test_helpers;
