//! Road network representation.
//!
//! The [`WorldMap`] maps each [`CityName`] to its outgoing [`Roads`]. Roads
//! are directed and labelled; a label is unique among a city's outgoing
//! roads, while two labels may lead to the same destination. Destroying a
//! city never scans the whole map on its own: callers prune inbound roads
//! explicitly through [`WorldMap::remove_inbound_roads`], so destinations
//! naming removed cities ("dangling" roads) are an expected state.

use std::{
    borrow::Borrow,
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

/// Identifier of a city in the road network.
///
/// Names are opaque and compared by their string value. Cloning is cheap.
///
/// # Examples
/// ```
/// use invasion_core::CityName;
///
/// let city = CityName::from("Foo");
/// assert_eq!(city.as_str(), "Foo");
/// assert_eq!(city.to_string(), "Foo");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityName(Arc<str>);

impl CityName {
    /// Creates a city name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CityName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CityName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Selects which cities are scanned for inbound roads when a city is
/// destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PruningPolicy {
    /// Scan only the destinations of the destroyed city's own roads.
    ///
    /// A city holding a one-way road into the destroyed city, which the
    /// destroyed city does not point back to, keeps a dangling road.
    #[default]
    Reciprocal,
    /// Scan every city, leaving no dangling roads behind.
    Exhaustive,
}

/// Outgoing roads of a single city, keyed by label.
///
/// # Examples
/// ```
/// use invasion_core::Roads;
///
/// let roads: Roads = [("north", "Bar"), ("west", "Baz")].into_iter().collect();
/// assert_eq!(roads.len(), 2);
/// assert_eq!(roads.get("north").map(|city| city.as_str()), Some("Bar"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roads {
    by_label: BTreeMap<String, CityName>,
}

impl Roads {
    /// Creates an empty road set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a road, returning the destination previously bound to `label`.
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        destination: impl Into<CityName>,
    ) -> Option<CityName> {
        self.by_label.insert(label.into(), destination.into())
    }

    /// Removes the road with `label`, returning its destination.
    pub fn remove(&mut self, label: &str) -> Option<CityName> {
        self.by_label.remove(label)
    }

    /// Returns the destination of the road with `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&CityName> {
        self.by_label.get(label)
    }

    /// Returns the number of roads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    /// Returns whether the city has no outgoing roads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    /// Iterates `(label, destination)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CityName)> {
        self.by_label
            .iter()
            .map(|(label, destination)| (label.as_str(), destination))
    }

    /// Iterates destinations in label order, repeating a destination once per
    /// road that leads to it.
    pub fn destinations(&self) -> impl Iterator<Item = &CityName> {
        self.by_label.values()
    }

    /// Removes every road leading to `city` and returns how many were removed.
    fn remove_leading_to(&mut self, city: &str) -> usize {
        let before = self.by_label.len();
        self.by_label
            .retain(|_, destination| destination.as_str() != city);
        before - self.by_label.len()
    }
}

impl<L, D> FromIterator<(L, D)> for Roads
where
    L: Into<String>,
    D: Into<CityName>,
{
    fn from_iter<I: IntoIterator<Item = (L, D)>>(iter: I) -> Self {
        let mut roads = Self::new();
        for (label, destination) in iter {
            roads.insert(label, destination);
        }
        roads
    }
}

/// A road whose destination is no longer a city of the map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DanglingRoad {
    /// City the road leaves from.
    pub origin: CityName,
    /// Label of the road.
    pub label: String,
    /// Missing destination.
    pub destination: CityName,
}

/// Directed, labelled road network.
///
/// # Examples
/// ```
/// use invasion_core::{PruningPolicy, WorldMap};
///
/// let mut world = WorldMap::new();
/// world.insert_road("venus", "north", "mars");
/// world.insert_road("venus", "east", "earth");
/// world.insert_road("mars", "south", "venus");
///
/// let pruned = world.remove_inbound_roads("mars", PruningPolicy::Reciprocal);
/// world.remove_city("mars");
/// assert_eq!(pruned, 1);
/// assert_eq!(world.len(), 1);
/// assert_eq!(world.destinations("venus").len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldMap {
    cities: BTreeMap<CityName, Roads>,
}

impl WorldMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `city` exists and returns its roads for editing.
    pub fn insert_city(&mut self, city: impl Into<CityName>) -> &mut Roads {
        self.cities.entry(city.into()).or_default()
    }

    /// Adds a road from `origin`, creating `origin` when it is missing.
    ///
    /// The destination is not created. Returns the destination previously
    /// bound to `label` on `origin`.
    pub fn insert_road(
        &mut self,
        origin: impl Into<CityName>,
        label: impl Into<String>,
        destination: impl Into<CityName>,
    ) -> Option<CityName> {
        self.insert_city(origin).insert(label, destination)
    }

    /// Removes `city` together with its outgoing roads.
    ///
    /// Roads in other cities that lead to `city` are left untouched.
    pub fn remove_city(&mut self, city: &str) -> Option<Roads> {
        self.cities.remove(city)
    }

    /// Removes roads leading to `city` from the cities selected by `policy`.
    ///
    /// Neighbours that are themselves missing from the map are skipped.
    /// Returns the number of roads removed.
    pub fn remove_inbound_roads(&mut self, city: &str, policy: PruningPolicy) -> usize {
        let scanned: BTreeSet<CityName> = match policy {
            PruningPolicy::Reciprocal => self
                .cities
                .get(city)
                .map(|roads| roads.destinations().cloned().collect())
                .unwrap_or_default(),
            PruningPolicy::Exhaustive => self.cities.keys().cloned().collect(),
        };

        let mut removed = 0;
        for neighbour in &scanned {
            if let Some(roads) = self.cities.get_mut(neighbour.as_str()) {
                removed += roads.remove_leading_to(city);
            }
        }
        removed
    }

    /// Returns the outgoing roads of `city`, or `None` when it does not exist.
    #[must_use]
    pub fn roads(&self, city: &str) -> Option<&Roads> {
        self.cities.get(city)
    }

    /// Returns the destinations reachable from `city` in one move.
    ///
    /// The result is a multiset: two roads to the same destination list it
    /// twice. Missing cities and cities without roads yield an empty list.
    #[must_use]
    pub fn destinations(&self, city: &str) -> Vec<CityName> {
        self.cities
            .get(city)
            .map(|roads| roads.destinations().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns whether `city` is part of the map.
    #[must_use]
    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains_key(city)
    }

    /// Returns the number of cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Returns whether every city has been destroyed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Iterates city names in sorted order.
    pub fn cities(&self) -> impl Iterator<Item = &CityName> {
        self.cities.keys()
    }

    /// Iterates cities and their roads in sorted city order.
    pub fn iter(&self) -> impl Iterator<Item = (&CityName, &Roads)> {
        self.cities.iter()
    }

    /// Returns the total number of roads across all cities.
    #[must_use]
    pub fn road_count(&self) -> usize {
        self.cities.values().map(Roads::len).sum()
    }

    /// Lists roads whose destination is not a city of the map.
    #[must_use]
    pub fn dangling_roads(&self) -> Vec<DanglingRoad> {
        self.cities
            .iter()
            .flat_map(|(origin, roads)| {
                roads
                    .iter()
                    .filter(|(_, destination)| !self.contains(destination.as_str()))
                    .map(|(label, destination)| DanglingRoad {
                        origin: origin.clone(),
                        label: label.to_owned(),
                        destination: destination.clone(),
                    })
            })
            .collect()
    }
}

impl FromIterator<(CityName, Roads)> for WorldMap {
    fn from_iter<I: IntoIterator<Item = (CityName, Roads)>>(iter: I) -> Self {
        Self {
            cities: iter.into_iter().collect(),
        }
    }
}
