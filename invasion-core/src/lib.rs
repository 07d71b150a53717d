//! Invasion core library.
//!
//! Aliens land on random cities of a directed road network and wander along
//! random roads. Two or more aliens meeting in a city destroy it, together
//! with the roads leading back to it, and die. [`Invasion`] runs rounds until
//! no alien or no city remains, or until the round ceiling is exceeded.
//!
//! # Metrics
//!
//! When the `metrics` feature is enabled the round engine emits:
//!
//! - `invasion_cities_destroyed` (counter)
//! - `invasion_aliens_killed` (counter)
//! - `invasion_rounds` (counter)
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aliens;
mod builder;
mod error;
mod invade;
mod invasion;
mod world;

#[cfg(test)]
mod test_utils;

pub use crate::{
    aliens::{AlienId, AlienIndex, IndexInvariantViolation},
    builder::InvasionBuilder,
    error::{InvasionError, InvasionErrorCode, Result},
    invade::invade,
    invasion::{
        DEFAULT_MAX_ROUNDS, Destruction, HaltReason, Invasion, InvasionOutcome, InvasionState,
    },
    world::{CityName, DanglingRoad, PruningPolicy, Roads, WorldMap},
};
