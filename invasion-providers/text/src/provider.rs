//! Map provider and the line parser behind it.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use invasion_core::{CityName, Roads, WorldMap};
use tracing::{debug, info, instrument, warn};

use crate::errors::MapProviderError;

/// A world map loaded from text.
#[derive(Debug, Clone)]
pub struct MapProvider {
    name: String,
    world: WorldMap,
}

impl MapProvider {
    /// Parses a map from `reader`.
    ///
    /// Blank lines are skipped and surrounding whitespace, including `\r`, is
    /// trimmed. Destinations that never get a line of their own stay
    /// dangling and are not created as cities. An empty source yields an
    /// empty map.
    ///
    /// # Errors
    /// Returns [`MapProviderError::Io`] when reading fails,
    /// [`MapProviderError::MalformedRoad`] for a token that is not
    /// `label=destination`, and [`MapProviderError::DuplicateCity`] when a
    /// city is declared twice.
    ///
    /// # Examples
    /// ```
    /// use std::io::Cursor;
    /// use invasion_providers_text::MapProvider;
    ///
    /// let text = "Foo north=Bar west=Baz\nBar south=Foo\n";
    /// let provider = MapProvider::try_from_reader("demo", Cursor::new(text))?;
    /// assert_eq!(provider.name(), "demo");
    /// assert_eq!(provider.world().len(), 2);
    /// assert!(!provider.world().contains("Baz"));
    /// # Ok::<(), invasion_providers_text::MapProviderError>(())
    /// ```
    #[instrument(name = "providers.text.load", skip(name, reader), fields(map = tracing::field::Empty))]
    pub fn try_from_reader<R>(name: impl Into<String>, reader: R) -> Result<Self, MapProviderError>
    where
        R: BufRead,
    {
        let name = name.into();
        tracing::Span::current().record("map", name.as_str());

        let mut world = WorldMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            let Some((city, roads)) = parse_line(number, &line)? else {
                continue;
            };
            if world.contains(city.as_str()) {
                return Err(MapProviderError::DuplicateCity {
                    line: number,
                    city: city.as_str().to_owned(),
                });
            }
            debug!(line = number, city = %city, roads = roads.len(), "city parsed");
            *world.insert_city(city) = roads;
        }

        let dangling = world.dangling_roads().len();
        if dangling > 0 {
            debug!(dangling, "map references undefined cities");
        }
        info!(
            cities = world.len(),
            roads = world.road_count(),
            "map loaded"
        );
        Ok(Self { name, world })
    }

    /// Opens `path` and parses it with [`Self::try_from_reader`], naming the
    /// provider after the path.
    ///
    /// # Errors
    /// Returns [`MapProviderError::Io`] when the file cannot be opened, plus
    /// every error of [`Self::try_from_reader`].
    pub fn try_from_path(path: impl AsRef<Path>) -> Result<Self, MapProviderError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::try_from_reader(path.display().to_string(), BufReader::new(file))
    }

    /// Returns the provider name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parsed map.
    #[must_use]
    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Consumes the provider and returns the parsed map.
    #[must_use]
    pub fn into_world(self) -> WorldMap {
        self.world
    }
}

/// Parses one line into a city and its roads; `None` for a blank line.
fn parse_line(number: usize, line: &str) -> Result<Option<(CityName, Roads)>, MapProviderError> {
    let mut tokens = line.split_whitespace();
    let Some(city) = tokens.next() else {
        return Ok(None);
    };

    let mut roads = Roads::new();
    for token in tokens {
        let (label, destination) = split_road(token).ok_or_else(|| {
            MapProviderError::MalformedRoad {
                line: number,
                token: token.to_owned(),
            }
        })?;
        if let Some(previous) = roads.insert(label, destination) {
            warn!(
                line = number,
                city,
                label,
                replaced = %previous,
                "road label repeated, keeping the last destination"
            );
        }
    }
    Ok(Some((CityName::from(city), roads)))
}

fn split_road(token: &str) -> Option<(&str, &str)> {
    let (label, destination) = token.split_once('=')?;
    let valid = !label.is_empty() && !destination.is_empty() && !destination.contains('=');
    valid.then_some((label, destination))
}
