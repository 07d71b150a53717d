//! Shared test utilities for `invasion-core`.

use invasion_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{AlienId, AlienIndex, WorldMap};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `INVASION_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Wraps a raw test identifier.
pub(crate) fn alien(id: u32) -> AlienId {
    match AlienId::try_from(id) {
        Ok(alien) => alien,
        Err(err) => panic!("test alien ids must be positive: {err}"),
    }
}

/// Builds a map from `(city, [(label, destination)])` rows.
///
/// Every listed city exists, even with no roads; destinations are not
/// created unless they have their own row.
pub(crate) fn world_from(rows: &[(&str, &[(&str, &str)])]) -> WorldMap {
    let mut world = WorldMap::new();
    for &(city, roads) in rows {
        let entry = world.insert_city(city);
        for &(label, destination) in roads {
            entry.insert(label, destination);
        }
    }
    world
}

/// Builds an index from `(city, [alien ids])` rows.
pub(crate) fn index_from(rows: &[(&str, &[u32])]) -> AlienIndex {
    rows.iter()
        .flat_map(|&(city, ids)| ids.iter().map(move |&id| (city, alien(id))))
        .collect()
}
