//! Alien identifiers and the city-to-occupants index.
//!
//! The [`AlienIndex`] records which aliens stand in which city. An alien is
//! in at most one city at a time and a city never keeps an empty occupant
//! set: entries are pruned as soon as their last alien leaves.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    num::{NonZeroU32, TryFromIntError},
};

use thiserror::Error;

use crate::world::CityName;

static NO_OCCUPANTS: BTreeSet<AlienId> = BTreeSet::new();

/// Identifier of an alien. Identifiers are positive.
///
/// # Examples
/// ```
/// use invasion_core::AlienId;
///
/// let alien = AlienId::try_from(7_u32).expect("7 is positive");
/// assert_eq!(alien.get(), 7);
/// assert!(AlienId::try_from(0_u32).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlienId(NonZeroU32);

impl AlienId {
    /// Wraps a positive identifier.
    #[must_use]
    pub const fn new(id: NonZeroU32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for AlienId {
    type Error = TryFromIntError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::try_from(value).map(Self)
    }
}

impl fmt::Display for AlienId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reports a broken [`AlienIndex`] invariant.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum IndexInvariantViolation {
    /// A city kept an entry after its last alien left.
    #[error("city `{city}` is indexed with no aliens")]
    EmptyCity {
        /// City holding the empty entry.
        city: CityName,
    },
    /// An alien is recorded in two cities at once.
    #[error("alien {alien} is indexed in both `{first}` and `{second}`")]
    DuplicateAlien {
        /// Alien recorded twice.
        alien: AlienId,
        /// First city recording the alien.
        first: CityName,
        /// Second city recording the alien.
        second: CityName,
    },
}

/// Maps each occupied city to the aliens currently standing there.
///
/// # Examples
/// ```
/// use invasion_core::{AlienId, AlienIndex};
///
/// let alien = AlienId::try_from(1_u32)?;
/// let mut index = AlienIndex::new();
/// index.place(alien, "venus");
/// index.relocate(alien, "venus", "mars");
/// assert!(index.occupants("venus").is_empty());
/// assert!(index.occupants("mars").contains(&alien));
/// assert_eq!(index.len(), 1);
/// # Ok::<(), std::num::TryFromIntError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlienIndex {
    spots: BTreeMap<CityName, BTreeSet<AlienId>>,
}

impl AlienIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `alien` in `city`. Returns `false` when it was already there.
    pub fn place(&mut self, alien: AlienId, city: impl Into<CityName>) -> bool {
        self.spots.entry(city.into()).or_default().insert(alien)
    }

    /// Moves `alien` from `from` to `to`.
    ///
    /// The `from` entry is pruned once empty. An alien that was not recorded
    /// in `from` is simply placed in `to`. Returns whether the alien was found
    /// in `from`.
    pub fn relocate(&mut self, alien: AlienId, from: &str, to: impl Into<CityName>) -> bool {
        let found = self.withdraw(alien, from);
        self.place(alien, to);
        found
    }

    fn withdraw(&mut self, alien: AlienId, city: &str) -> bool {
        let Some(occupants) = self.spots.get_mut(city) else {
            return false;
        };
        let found = occupants.remove(&alien);
        if occupants.is_empty() {
            self.spots.remove(city);
        }
        found
    }

    /// Returns the aliens in `city`, or an empty set when none are there.
    #[must_use]
    pub fn occupants(&self, city: &str) -> &BTreeSet<AlienId> {
        self.spots.get(city).unwrap_or(&NO_OCCUPANTS)
    }

    /// Iterates cities holding at least one alien, in sorted order.
    pub fn occupied_cities(&self) -> impl Iterator<Item = &CityName> {
        self.spots.keys()
    }

    /// Iterates occupied cities with their occupants.
    pub fn iter(&self) -> impl Iterator<Item = (&CityName, &BTreeSet<AlienId>)> {
        self.spots.iter()
    }

    /// Removes `city` from the index, returning the aliens it held.
    pub fn evict(&mut self, city: &str) -> Option<BTreeSet<AlienId>> {
        self.spots.remove(city)
    }

    /// Returns the city `alien` stands in.
    #[must_use]
    pub fn location_of(&self, alien: AlienId) -> Option<&CityName> {
        self.spots
            .iter()
            .find_map(|(city, occupants)| occupants.contains(&alien).then_some(city))
    }

    /// Returns the number of aliens across all cities.
    #[must_use]
    pub fn alien_count(&self) -> usize {
        self.spots.values().map(BTreeSet::len).sum()
    }

    /// Returns the number of occupied cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// Returns whether no alien remains anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Verifies that no entry is empty and no alien appears twice.
    ///
    /// # Errors
    /// Returns the first [`IndexInvariantViolation`] found, scanning cities in
    /// sorted order.
    pub fn check_invariants(&self) -> Result<(), IndexInvariantViolation> {
        let mut seen: BTreeMap<AlienId, &CityName> = BTreeMap::new();
        for (city, occupants) in &self.spots {
            if occupants.is_empty() {
                return Err(IndexInvariantViolation::EmptyCity { city: city.clone() });
            }
            for &alien in occupants {
                if let Some(first) = seen.insert(alien, city) {
                    return Err(IndexInvariantViolation::DuplicateAlien {
                        alien,
                        first: first.clone(),
                        second: city.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<C: Into<CityName>> FromIterator<(C, AlienId)> for AlienIndex {
    fn from_iter<I: IntoIterator<Item = (C, AlienId)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (city, alien) in iter {
            index.place(alien, city);
        }
        index
    }
}

#[cfg(test)]
mod tests;
