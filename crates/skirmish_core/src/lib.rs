//! # Skirmish Core
//!
//! Deterministic combat engine for a grid-placed auto-battler.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No system randomness (a seeded stream drives critical hits)
//! - No wall-clock time
//! - No floating-point math in combat (uses fixed-point)
//!
//! This separation enables:
//! - Authoritative results that third parties can re-simulate
//! - Replay verification by digest
//! - Parallel batch runs with no shared state
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`data`] - Hero and ability content, roster lookup
//! - [`team`] - Team composition and validation
//! - [`unit`] - Runtime unit state
//! - [`targeting`] - Target selection
//! - [`actions`] - Per-unit turn resolution
//! - [`combat`] - Damage and healing
//! - [`simulation`] - Core battle loop
//! - [`result`] - Outcome, MVP and digest
//! - [`engine`] - Stateless service facade
//! - [`replay`] - Verifiable battle records

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod combat;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod log;
pub mod math;
pub mod replay;
pub mod result;
pub mod simulation;
pub mod targeting;
pub mod team;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::data::{AbilityDefinition, AbilityKind, HeroDefinition, HeroRoster, Role};
    pub use crate::engine::BattleEngine;
    pub use crate::error::{BattleError, Result};
    pub use crate::log::{ActionKind, CombatAction};
    pub use crate::math::Fixed;
    pub use crate::replay::BattleRecord;
    pub use crate::result::{BattleResult, MvpRecord, Winner};
    pub use crate::simulation::{Battle, BattlePhase};
    pub use crate::team::{validate_team, GridPosition, Team, TeamSlot, TeamValidation};
    pub use crate::unit::{BattleUnit, UnitId};
}
