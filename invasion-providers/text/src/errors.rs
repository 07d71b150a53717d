use std::{fmt, io};

use thiserror::Error;

/// Failure while loading a world map.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MapProviderError {
    /// Reading the underlying source failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A road token was not of the form `label=destination`.
    #[error("line {line}: malformed road `{token}`, expected `label=destination`")]
    MalformedRoad {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// A city was declared on more than one line.
    #[error("line {line}: city `{city}` is already defined")]
    DuplicateCity {
        /// One-based line number of the repeated declaration.
        line: usize,
        /// Repeated city name.
        city: String,
    },
}

/// Stable machine-readable codes for [`MapProviderError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum MapProviderErrorCode {
    /// See [`MapProviderError::Io`].
    Io,
    /// See [`MapProviderError::MalformedRoad`].
    MalformedRoad,
    /// See [`MapProviderError::DuplicateCity`].
    DuplicateCity,
}

impl MapProviderErrorCode {
    /// Return the stable machine-readable representation of this error code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Io => "MAP_IO",
            Self::MalformedRoad => "MAP_MALFORMED_ROAD",
            Self::DuplicateCity => "MAP_DUPLICATE_CITY",
        }
    }
}

impl fmt::Display for MapProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MapProviderError {
    /// Retrieve the stable [`MapProviderErrorCode`] for this error.
    pub const fn code(&self) -> MapProviderErrorCode {
        match self {
            Self::Io(_) => MapProviderErrorCode::Io,
            Self::MalformedRoad { .. } => MapProviderErrorCode::MalformedRoad,
            Self::DuplicateCity { .. } => MapProviderErrorCode::DuplicateCity,
        }
    }
}
