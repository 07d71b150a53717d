//! Round engine driving the invasion to completion.
//!
//! A round is one movement phase ([`Invasion::wander`]) followed by one
//! collision phase ([`Invasion::resolve`]). Both phases snapshot the alien
//! index before mutating it, so an alien moves at most once per round and
//! cities destroyed early in a phase never disturb the traversal.

use std::{collections::BTreeSet, fmt, num::NonZeroUsize};

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, info, instrument, trace};

use crate::{
    aliens::{AlienId, AlienIndex},
    world::{CityName, PruningPolicy, WorldMap},
};

/// Round ceiling applied when none is configured.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Number of aliens that destroy a city by meeting in it.
const COLLISION_THRESHOLD: usize = 2;

/// A city destroyed by the aliens that met there.
///
/// The [`fmt::Display`] form is the report line printed for the event.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use invasion_core::{AlienId, CityName, Destruction};
///
/// let aliens: BTreeSet<AlienId> = [3_u32, 1, 2]
///     .into_iter()
///     .map(AlienId::try_from)
///     .collect::<Result<_, _>>()?;
/// let event = Destruction { city: CityName::from("Foo"), aliens, round: 4 };
/// assert_eq!(
///     event.to_string(),
///     "Foo has been destroyed by alien 1, alien 2 and alien 3!",
/// );
/// # Ok::<(), std::num::TryFromIntError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destruction {
    /// The destroyed city.
    pub city: CityName,
    /// Aliens killed in the city.
    pub aliens: BTreeSet<AlienId>,
    /// Rounds completed when the city fell; `0` for the landing pass.
    pub round: usize,
}

impl fmt::Display for Destruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has been destroyed by ", self.city)?;
        let mut aliens = self.aliens.iter().peekable();
        let mut first = true;
        while let Some(alien) = aliens.next() {
            if !first {
                let joiner = if aliens.peek().is_some() { ", " } else { " and " };
                f.write_str(joiner)?;
            }
            write!(f, "alien {alien}")?;
            first = false;
        }
        f.write_str("!")
    }
}

/// Why an invasion stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// Every alien has died.
    NoAliens,
    /// Every city has been destroyed.
    NoCities,
    /// The round ceiling was exceeded.
    MoveLimit,
}

impl HaltReason {
    /// Returns a stable label for logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAliens => "no_aliens",
            Self::NoCities => "no_cities",
            Self::MoveLimit => "move_limit",
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an [`Invasion`]. `Running` is initial, `Halted` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvasionState {
    /// More rounds may execute.
    Running,
    /// No further round will execute.
    Halted(HaltReason),
}

/// Final state of a completed invasion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvasionOutcome {
    /// Surviving cities and roads.
    pub world: WorldMap,
    /// Destroyed cities in the order they fell.
    pub events: Vec<Destruction>,
    /// Number of rounds executed.
    pub rounds: usize,
    /// Condition that stopped the invasion.
    pub halt_reason: HaltReason,
    /// Aliens still alive, by city.
    pub survivors: AlienIndex,
}

/// Owns the map, the alien index and the random source of one simulation.
///
/// Construct instances through [`crate::InvasionBuilder`].
///
/// # Examples
/// ```
/// use invasion_core::{HaltReason, InvasionBuilder, WorldMap};
///
/// // Every road ends in `mars`, which has none, so two aliens always meet.
/// let mut world = WorldMap::new();
/// world.insert_road("venus", "north", "mars");
/// world.insert_city("mars");
///
/// let mut invasion = InvasionBuilder::new()
///     .with_alien_count(2)
///     .with_seed(11)
///     .build(world)?;
/// assert_eq!(invasion.run(), HaltReason::NoAliens);
/// assert!(invasion.aliens().is_empty());
/// assert_eq!(invasion.world().len(), 1);
/// # Ok::<(), invasion_core::InvasionError>(())
/// ```
#[derive(Debug)]
pub struct Invasion<R> {
    world: WorldMap,
    aliens: AlienIndex,
    rng: R,
    max_rounds: NonZeroUsize,
    pruning: PruningPolicy,
    rounds: usize,
    settled: bool,
    state: InvasionState,
    events: Vec<Destruction>,
}

impl<R: Rng> Invasion<R> {
    pub(crate) fn new(
        world: WorldMap,
        aliens: AlienIndex,
        rng: R,
        max_rounds: NonZeroUsize,
        pruning: PruningPolicy,
    ) -> Self {
        Self {
            world,
            aliens,
            rng,
            max_rounds,
            pruning,
            rounds: 0,
            settled: false,
            state: InvasionState::Running,
            events: Vec::new(),
        }
    }

    /// Returns the current map.
    #[must_use]
    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Returns the current alien index.
    #[must_use]
    pub fn aliens(&self) -> &AlienIndex {
        &self.aliens
    }

    /// Returns every destruction so far, in order.
    #[must_use]
    pub fn events(&self) -> &[Destruction] {
        &self.events
    }

    /// Returns the number of rounds executed.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> InvasionState {
        self.state
    }

    /// Returns the configured round ceiling.
    #[must_use]
    pub fn max_rounds(&self) -> NonZeroUsize {
        self.max_rounds
    }

    /// Returns the configured pruning policy.
    #[must_use]
    pub fn pruning(&self) -> PruningPolicy {
        self.pruning
    }

    /// Moves every alien along one road drawn uniformly from its city.
    ///
    /// Aliens in a city without roads, or in a city that only survives as a
    /// dangling destination, stay put. The draw is over the destination
    /// multiset, so a destination reached by two roads is twice as likely.
    /// Returns the number of aliens that moved.
    #[instrument(name = "core.wander", level = "debug", skip(self), fields(round = self.rounds + 1))]
    pub fn wander(&mut self) -> usize {
        let snapshot: Vec<(CityName, Vec<AlienId>)> = self
            .aliens
            .iter()
            .map(|(city, occupants)| (city.clone(), occupants.iter().copied().collect()))
            .collect();

        let mut moved = 0;
        for (origin, occupants) in snapshot {
            let destinations = self.world.destinations(origin.as_str());
            if destinations.is_empty() {
                trace!(city = %origin, aliens = occupants.len(), "aliens trapped");
                continue;
            }
            for alien in occupants {
                if let Some(destination) = destinations.choose(&mut self.rng) {
                    self.aliens
                        .relocate(alien, origin.as_str(), destination.clone());
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Destroys every city holding two or more aliens.
    ///
    /// For each such city the destruction is recorded, roads leading back to
    /// it are pruned according to the configured [`PruningPolicy`], the city
    /// is removed from the map and its aliens are removed from the index.
    /// Cities with fewer aliens are untouched, so a second call without
    /// movement in between does nothing. Returns the destructions caused by
    /// this call.
    #[instrument(name = "core.resolve", level = "debug", skip(self), fields(round = self.rounds))]
    pub fn resolve(&mut self) -> Vec<Destruction> {
        let crowded: Vec<(CityName, BTreeSet<AlienId>)> = self
            .aliens
            .iter()
            .filter(|(_, occupants)| occupants.len() >= COLLISION_THRESHOLD)
            .map(|(city, occupants)| (city.clone(), occupants.clone()))
            .collect();

        let mut destroyed = Vec::with_capacity(crowded.len());
        for (city, aliens) in crowded {
            let event = Destruction {
                city,
                aliens,
                round: self.rounds,
            };
            info!(
                city = %event.city,
                aliens = event.aliens.len(),
                round = event.round,
                "{event}"
            );

            let pruned = self
                .world
                .remove_inbound_roads(event.city.as_str(), self.pruning);
            self.world.remove_city(event.city.as_str());
            self.aliens.evict(event.city.as_str());
            debug!(city = %event.city, pruned, "city removed");
            record_destruction(event.aliens.len());

            destroyed.push(event);
        }
        self.events.extend(destroyed.iter().cloned());
        destroyed
    }

    /// Executes one round and returns the resulting state.
    ///
    /// The first call also runs a landing pass that destroys cities where
    /// several aliens landed. Halting conditions are checked after the
    /// landing pass and after every round: the ceiling first, then the map,
    /// then the index. Calling `step` on a halted invasion does nothing.
    pub fn step(&mut self) -> InvasionState {
        if let InvasionState::Halted(_) = self.state {
            return self.state;
        }
        if !self.settled {
            self.settled = true;
            self.resolve();
            if self.check_halt() {
                return self.state;
            }
        }

        self.wander();
        self.rounds += 1;
        self.resolve();
        record_round();
        self.check_halt();
        self.state
    }

    /// Runs rounds until a halting condition holds.
    #[instrument(
        name = "core.run",
        skip(self),
        fields(
            cities = self.world.len(),
            aliens = self.aliens.alien_count(),
            max_rounds = self.max_rounds.get(),
            pruning = ?self.pruning,
        ),
    )]
    pub fn run(&mut self) -> HaltReason {
        loop {
            if let InvasionState::Halted(reason) = self.step() {
                return reason;
            }
        }
    }

    /// Runs to completion and returns the final state.
    #[must_use]
    pub fn finish(mut self) -> InvasionOutcome {
        let halt_reason = self.run();
        InvasionOutcome {
            world: self.world,
            events: self.events,
            rounds: self.rounds,
            halt_reason,
            survivors: self.aliens,
        }
    }

    /// Moves to [`InvasionState::Halted`] when a halting condition holds.
    fn check_halt(&mut self) -> bool {
        let Some(reason) = self.halt_reason() else {
            return false;
        };
        self.state = InvasionState::Halted(reason);
        info!(
            rounds = self.rounds,
            reason = reason.as_str(),
            cities = self.world.len(),
            aliens = self.aliens.alien_count(),
            "invasion halted"
        );
        true
    }

    fn halt_reason(&self) -> Option<HaltReason> {
        if self.rounds > self.max_rounds.get() {
            Some(HaltReason::MoveLimit)
        } else if self.world.is_empty() {
            Some(HaltReason::NoCities)
        } else if self.aliens.is_empty() {
            Some(HaltReason::NoAliens)
        } else {
            None
        }
    }
}

#[cfg(feature = "metrics")]
fn record_destruction(killed: usize) {
    metrics::counter!("invasion_cities_destroyed").increment(1);
    metrics::counter!("invasion_aliens_killed").increment(killed as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_destruction(_killed: usize) {}

#[cfg(feature = "metrics")]
fn record_round() {
    metrics::counter!("invasion_rounds").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_round() {}


#[cfg(test)]
mod property;
