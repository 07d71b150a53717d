//! Initial placement of aliens on the map.

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, instrument, warn};

use crate::{
    aliens::{AlienId, AlienIndex},
    world::{CityName, WorldMap},
};

/// Lands aliens `1..=alien_count` on cities drawn uniformly from `world`.
///
/// Every draw is independent, so several aliens may land in the same city.
/// An empty map yields an empty index and no alien is spawned.
///
/// # Examples
/// ```
/// use invasion_core::{WorldMap, invade};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut world = WorldMap::new();
/// world.insert_road("venus", "north", "mars");
/// let mut rng = SmallRng::seed_from_u64(7);
///
/// let index = invade(3, &world, &mut rng);
/// assert_eq!(index.alien_count(), 3);
/// assert_eq!(index.occupants("venus").len(), 3);
/// ```
#[instrument(
    name = "core.invade",
    skip(world, rng),
    fields(cities = world.len()),
)]
pub fn invade<R: Rng + ?Sized>(alien_count: u32, world: &WorldMap, rng: &mut R) -> AlienIndex {
    let mut index = AlienIndex::new();
    let cities: Vec<&CityName> = world.cities().collect();
    if cities.is_empty() {
        warn!(alien_count, "map has no cities, no alien can land");
        return index;
    }

    for alien in (1..=alien_count).filter_map(|raw| AlienId::try_from(raw).ok()) {
        if let Some(&city) = cities.choose(rng) {
            debug!(alien = alien.get(), city = %city, "alien landed");
            index.place(alien, city.clone());
        }
    }
    index
}
