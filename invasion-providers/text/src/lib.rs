//! Text provider reading line-oriented world maps.
//!
//! Each non-blank line names a city followed by its outgoing roads:
//!
//! ```text
//! Foo north=Bar west=Baz south=Qu-ux
//! Bar south=Foo west=Bee
//! ```

mod errors;
mod provider;

pub use errors::{MapProviderError, MapProviderErrorCode};
pub use provider::MapProvider;
