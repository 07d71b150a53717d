//! Argument parsing, the simulation driver and the report renderer.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use invasion_core::{
    DEFAULT_MAX_ROUNDS, InvasionBuilder, InvasionError, InvasionOutcome, InvasionState,
    PruningPolicy, WorldMap,
};
use invasion_providers_text::{MapProvider, MapProviderError};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Map loaded when `--map` is not given.
pub const DEFAULT_MAP_PATH: &str = "worldmap/universe.txt";

const REMAINING_WORLD_HEADER: &str = "----- THE REMAINING WORLD ----------";
const ALL_DESTROYED: &str = "All cities are destroyed.";

/// Options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "invasion",
    about = "Land aliens on a world map and watch them destroy it."
)]
pub struct Cli {
    /// Number of aliens to land.
    #[arg(value_parser = clap::value_parser!(usize))]
    pub aliens: usize,

    /// World map to invade, one city per line.
    #[arg(long, default_value = DEFAULT_MAP_PATH)]
    pub map: PathBuf,

    /// Seed for a reproducible run; drawn from the OS when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rounds allowed before the invasion is called off.
    #[arg(long = "max-rounds", default_value_t = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,

    /// Which cities lose their roads into a destroyed city.
    #[arg(long, value_enum, default_value_t = PruningArg::Reciprocal)]
    pub pruning: PruningArg,
}

/// Pruning policies selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PruningArg {
    /// Only the destroyed city's own neighbours lose their roads into it.
    Reciprocal,
    /// Every surviving city loses its roads into the destroyed city.
    Exhaustive,
}

impl PruningArg {
    const fn label(self) -> &'static str {
        match self {
            Self::Reciprocal => "reciprocal",
            Self::Exhaustive => "exhaustive",
        }
    }
}

impl From<PruningArg> for PruningPolicy {
    fn from(value: PruningArg) -> Self {
        match value {
            PruningArg::Reciprocal => Self::Reciprocal,
            PruningArg::Exhaustive => Self::Exhaustive,
        }
    }
}

/// Errors surfaced while running the command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The map file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The map file could not be parsed.
    #[error(transparent)]
    Map(#[from] MapProviderError),
    /// The simulation configuration was rejected.
    #[error(transparent)]
    Core(#[from] InvasionError),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    /// Returns the stable code of the underlying library error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Io { .. } | Self::Output(_) => None,
            Self::Map(err) => Some(err.code().as_str()),
            Self::Core(err) => Some(err.code().as_str()),
        }
    }
}

/// Loads the map named by `cli` and runs the invasion to completion.
///
/// Each destruction line is written to `out` and flushed as soon as the
/// round that caused it ends. The remaining world is left to
/// [`render_remaining_world`].
///
/// # Errors
/// Returns [`CliError`] when the map cannot be read or parsed, when the
/// simulation configuration is invalid, or when writing to `out` fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use invasion_cli::cli::{Cli, PruningArg, run_cli};
/// # use invasion_core::HaltReason;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "venus\n")?;
/// let cli = Cli {
///     aliens: 2,
///     map: file.path().to_path_buf(),
///     seed: Some(1),
///     max_rounds: 10,
///     pruning: PruningArg::Reciprocal,
/// };
/// let mut out = Vec::new();
/// let outcome = run_cli(cli, &mut out)?;
/// assert_eq!(outcome.halt_reason, HaltReason::NoCities);
/// assert_eq!(
///     String::from_utf8(out)?,
///     "venus has been destroyed by alien 1 and alien 2!\n",
/// );
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli, out),
    fields(
        aliens = cli.aliens,
        map = field::Empty,
        seed = field::Empty,
        max_rounds = cli.max_rounds,
        pruning = cli.pruning.label(),
    ),
)]
pub fn run_cli(cli: Cli, mut out: impl Write) -> Result<InvasionOutcome, CliError> {
    let span = Span::current();
    span.record("map", field::display(cli.map.display()));
    if let Some(seed) = cli.seed {
        span.record("seed", seed);
    }

    let provider = load_map(&cli.map)?;
    let mut builder = InvasionBuilder::new()
        .with_alien_count(cli.aliens)
        .with_max_rounds(cli.max_rounds)
        .with_pruning(cli.pruning.into());
    if let Some(seed) = cli.seed {
        builder = builder.with_seed(seed);
    }

    let map = provider.name().to_owned();
    let mut invasion = builder.build(provider.into_world())?;
    let mut reported = 0;
    loop {
        let state = invasion.step();
        let fresh = invasion.events().get(reported..).unwrap_or_default();
        if !fresh.is_empty() {
            for event in fresh {
                writeln!(out, "{event}").map_err(CliError::Output)?;
            }
            out.flush().map_err(CliError::Output)?;
            reported += fresh.len();
        }
        if let InvasionState::Halted(_) = state {
            break;
        }
    }

    let outcome = invasion.finish();
    info!(
        map = map.as_str(),
        halt_reason = outcome.halt_reason.as_str(),
        rounds = outcome.rounds,
        destroyed = outcome.events.len(),
        survivors = outcome.survivors.alien_count(),
        "invasion completed"
    );
    Ok(outcome)
}

fn load_map(path: &Path) -> Result<MapProvider, CliError> {
    let reader = open_map_reader(path)?;
    Ok(MapProvider::try_from_reader(derive_map_name(path), reader)?)
}

#[instrument(name = "cli.open_map_reader", err, fields(path = field::Empty))]
pub(super) fn open_map_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_map_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "world".to_owned())
}

/// Writes the remaining-world section that closes the report: a blank line,
/// the header and one line per surviving city, or a note that none is left.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use invasion_cli::cli::render_remaining_world;
/// # use invasion_core::WorldMap;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut world = WorldMap::new();
/// world.insert_road("venus", "north", "mars");
/// let mut buffer = Vec::new();
/// render_remaining_world(&world, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "\n----- THE REMAINING WORLD ----------\nvenus north=mars\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_remaining_world(world: &WorldMap, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{REMAINING_WORLD_HEADER}")?;
    if world.is_empty() {
        return writeln!(writer, "{ALL_DESTROYED}");
    }
    for (city, roads) in world.iter() {
        write!(writer, "{city}")?;
        for (label, destination) in roads.iter() {
            write!(writer, " {label}={destination}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
