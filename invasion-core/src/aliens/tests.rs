//! Unit tests for alien relocation and index bookkeeping.

use std::collections::BTreeSet;

use rstest::rstest;

use super::{AlienId, AlienIndex, IndexInvariantViolation};
use crate::world::CityName;

fn alien(id: u32) -> AlienId {
    AlienId::try_from(id).expect("test ids are positive")
}

fn ids(raw: &[u32]) -> BTreeSet<AlienId> {
    raw.iter().copied().map(alien).collect()
}

#[rstest]
fn place_groups_aliens_by_city() {
    let index: AlienIndex = [("venus", alien(1)), ("venus", alien(2)), ("mars", alien(3))]
        .into_iter()
        .collect();
    assert_eq!(index.len(), 2);
    assert_eq!(index.alien_count(), 3);
    assert_eq!(index.occupants("venus"), &ids(&[1, 2]));
    assert_eq!(index.occupants("mars"), &ids(&[3]));
}

#[rstest]
fn place_twice_is_idempotent() {
    let mut index = AlienIndex::new();
    assert!(index.place(alien(1), "venus"));
    assert!(!index.place(alien(1), "venus"));
    assert_eq!(index.alien_count(), 1);
}

#[rstest]
fn relocate_prunes_emptied_city() {
    let mut index: AlienIndex = [("venus", alien(1))].into_iter().collect();
    assert!(index.relocate(alien(1), "venus", "mars"));
    assert_eq!(index.occupied_cities().collect::<Vec<_>>(), [&CityName::from("mars")]);
    assert!(index.check_invariants().is_ok());
}

#[rstest]
fn relocate_keeps_remaining_occupants() {
    let mut index: AlienIndex = [("venus", alien(1)), ("venus", alien(2))]
        .into_iter()
        .collect();
    index.relocate(alien(1), "venus", "mars");
    assert_eq!(index.occupants("venus"), &ids(&[2]));
    assert_eq!(index.occupants("mars"), &ids(&[1]));
}

#[rstest]
fn relocate_to_same_city_is_net_noop() {
    let mut index: AlienIndex = [("venus", alien(1)), ("venus", alien(2))]
        .into_iter()
        .collect();
    let before = index.clone();
    assert!(index.relocate(alien(1), "venus", "venus"));
    assert_eq!(index, before);

    let mut lone: AlienIndex = [("venus", alien(1))].into_iter().collect();
    let lone_before = lone.clone();
    lone.relocate(alien(1), "venus", "venus");
    assert_eq!(lone, lone_before);
}

#[rstest]
#[case::unknown_city("pluto")]
#[case::other_city("mars")]
fn relocate_unindexed_alien_inserts_at_destination(#[case] from: &str) {
    let mut index: AlienIndex = [("mars", alien(2))].into_iter().collect();
    assert!(!index.relocate(alien(1), from, "venus"));
    assert_eq!(index.occupants("venus"), &ids(&[1]));
    assert_eq!(index.occupants("mars"), &ids(&[2]));
    assert_eq!(index.alien_count(), 2);
}

#[rstest]
fn occupants_of_unknown_city_is_empty() {
    let index = AlienIndex::new();
    assert!(index.occupants("nowhere").is_empty());
    assert!(index.is_empty());
}

#[rstest]
fn evict_removes_city_and_its_aliens() {
    let mut index: AlienIndex = [("mars", alien(1)), ("mars", alien(2)), ("venus", alien(3))]
        .into_iter()
        .collect();
    assert_eq!(index.evict("mars"), Some(ids(&[1, 2])));
    assert_eq!(index.evict("mars"), None);
    assert_eq!(index.alien_count(), 1);
    assert_eq!(index.location_of(alien(1)), None);
}

#[rstest]
fn location_of_finds_alien() {
    let index: AlienIndex = [("mars", alien(1)), ("venus", alien(3))]
        .into_iter()
        .collect();
    assert_eq!(index.location_of(alien(3)), Some(&CityName::from("venus")));
    assert_eq!(index.location_of(alien(9)), None);
}

#[rstest]
fn check_invariants_reports_duplicate_alien() {
    let mut index = AlienIndex::new();
    index.place(alien(4), "mars");
    index.place(alien(4), "venus");
    let err = index
        .check_invariants()
        .expect_err("an alien in two cities must be rejected");
    assert_eq!(
        err,
        IndexInvariantViolation::DuplicateAlien {
            alien: alien(4),
            first: CityName::from("mars"),
            second: CityName::from("venus"),
        }
    );
}

#[rstest]
fn alien_id_rejects_zero() {
    assert!(AlienId::try_from(0_u32).is_err());
    assert_eq!(alien(12).to_string(), "12");
}
