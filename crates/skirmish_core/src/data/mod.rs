//! Data structures for hero content.
//!
//! This module contains pure data structures that define heroes and their
//! abilities. All structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses text handed to it. File loading is handled by `skirmish_headless`.

mod hero_data;
mod roster;

pub use hero_data::{
    AbilityDefinition, AbilityEffect, AbilityKind, BaseStats, HeroDefinition, Role, StatScaling,
    MAX_STAT_VALUE,
};
pub use roster::HeroRoster;
