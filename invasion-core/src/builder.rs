//! Builder utilities for configuring an [`Invasion`].
//!
//! The builder validates the configuration, lands the aliens and wires the
//! random source into the round engine.

use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    Result,
    aliens::AlienIndex,
    error::InvasionError,
    invade::invade,
    invasion::{DEFAULT_MAX_ROUNDS, Invasion},
    world::{PruningPolicy, WorldMap},
};

/// Configures and constructs [`Invasion`] instances.
///
/// # Examples
/// ```
/// use invasion_core::{InvasionBuilder, PruningPolicy, WorldMap};
///
/// let mut world = WorldMap::new();
/// world.insert_city("venus");
///
/// let invasion = InvasionBuilder::new()
///     .with_alien_count(1)
///     .with_max_rounds(50)
///     .with_pruning(PruningPolicy::Exhaustive)
///     .with_seed(3)
///     .build(world)
///     .expect("builder configuration is valid");
/// assert_eq!(invasion.max_rounds().get(), 50);
/// assert_eq!(invasion.aliens().alien_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct InvasionBuilder {
    alien_count: usize,
    max_rounds: usize,
    seed: Option<u64>,
    pruning: PruningPolicy,
}

impl Default for InvasionBuilder {
    fn default() -> Self {
        Self {
            alien_count: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
            pruning: PruningPolicy::default(),
        }
    }
}

impl InvasionBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use invasion_core::{InvasionBuilder, PruningPolicy};
    ///
    /// let builder = InvasionBuilder::new();
    /// assert_eq!(builder.alien_count(), 0);
    /// assert_eq!(builder.max_rounds(), 10_000);
    /// assert_eq!(builder.seed(), None);
    /// assert_eq!(builder.pruning(), PruningPolicy::Reciprocal);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many aliens land on the map.
    #[must_use]
    pub fn with_alien_count(mut self, count: usize) -> Self {
        self.alien_count = count;
        self
    }

    /// Returns the configured alien count.
    #[must_use]
    pub fn alien_count(&self) -> usize {
        self.alien_count
    }

    /// Overrides the round ceiling.
    ///
    /// The invasion halts once the number of executed rounds exceeds this
    /// value.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Returns the configured round ceiling.
    #[must_use]
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Seeds the random source so the run is reproducible.
    ///
    /// Without a seed, [`Self::build`] seeds from operating-system entropy.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the configured seed, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Selects how inbound roads are pruned when a city is destroyed.
    #[must_use]
    pub fn with_pruning(mut self, pruning: PruningPolicy) -> Self {
        self.pruning = pruning;
        self
    }

    /// Returns the configured pruning policy.
    #[must_use]
    pub fn pruning(&self) -> PruningPolicy {
        self.pruning
    }

    /// Validates the configuration, lands the aliens using a [`SmallRng`] and
    /// constructs the [`Invasion`].
    ///
    /// # Errors
    /// Returns [`InvasionError::InvalidMaxRounds`] for a zero ceiling and
    /// [`InvasionError::TooManyAliens`] when the alien count exceeds the
    /// identifier space.
    pub fn build(self, world: WorldMap) -> Result<Invasion<SmallRng>> {
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        self.build_with_rng(world, rng)
    }

    /// Validates the configuration and lands the aliens using `rng`, which
    /// then drives every later round. The configured seed is ignored.
    ///
    /// # Errors
    /// Same as [`Self::build`].
    pub fn build_with_rng<R: Rng>(self, world: WorldMap, mut rng: R) -> Result<Invasion<R>> {
        let max_rounds = self.validated_max_rounds()?;
        let alien_count =
            u32::try_from(self.alien_count).map_err(|_| InvasionError::TooManyAliens {
                requested: self.alien_count,
                max: u32::MAX as usize,
            })?;
        let aliens = invade(alien_count, &world, &mut rng);
        Ok(Invasion::new(world, aliens, rng, max_rounds, self.pruning))
    }

    /// Validates the configuration and starts from an existing alien
    /// placement instead of landing new aliens. The configured alien count
    /// and seed are ignored.
    ///
    /// # Errors
    /// Returns [`InvasionError::InvalidMaxRounds`] for a zero ceiling.
    pub fn build_with_aliens<R: Rng>(
        self,
        world: WorldMap,
        aliens: AlienIndex,
        rng: R,
    ) -> Result<Invasion<R>> {
        let max_rounds = self.validated_max_rounds()?;
        Ok(Invasion::new(world, aliens, rng, max_rounds, self.pruning))
    }

    fn validated_max_rounds(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.max_rounds).ok_or(InvasionError::InvalidMaxRounds {
            got: self.max_rounds,
        })
    }
}
