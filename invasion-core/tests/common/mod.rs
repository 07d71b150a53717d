use invasion_core::{AlienId, AlienIndex, WorldMap};

#[must_use]
pub fn alien(id: u32) -> AlienId {
    AlienId::try_from(id).expect("test alien ids must be positive")
}

/// Two cities joined by a road in each direction.
#[must_use]
pub fn shuttle() -> WorldMap {
    let mut world = WorldMap::new();
    world.insert_road("venus", "north", "mars");
    world.insert_road("mars", "south", "venus");
    world
}

#[must_use]
pub fn index_of(rows: &[(&str, u32)]) -> AlienIndex {
    rows.iter().map(|&(city, id)| (city, alien(id))).collect()
}
