//! Stateless battle service.

use crate::config::EngineConfig;
use crate::data::HeroRoster;
use crate::error::Result;
use crate::result::BattleResult;
use crate::simulation::Battle;
use crate::team::{validate_team, TeamSlot, TeamValidation};

/// Entry point for validating teams and simulating battles.
///
/// Holds only its configuration, so one engine can be cloned or shared
/// across threads and drive any number of battles at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleEngine {
    config: EngineConfig,
}

impl BattleEngine {
    /// Create an engine with a validated configuration.
    ///
    /// # Errors
    /// Returns [`crate::error::BattleError::InvalidConfig`] if the config is
    /// unusable.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check a team's structure. See [`validate_team`].
    #[must_use]
    pub fn validate_team(&self, team: &[TeamSlot]) -> TeamValidation {
        validate_team(team)
    }

    /// Simulate a battle with the configured default seed.
    ///
    /// Identical inputs always produce an identical result.
    ///
    /// # Errors
    /// - [`crate::error::BattleError::InvalidTeam`] if either team is malformed
    /// - [`crate::error::BattleError::HeroNotFound`] if a hero id is unknown
    pub fn simulate_battle(
        &self,
        blue: &[TeamSlot],
        red: &[TeamSlot],
        roster: &HeroRoster,
    ) -> Result<BattleResult> {
        self.simulate_battle_seeded(blue, red, roster, self.config.default_seed)
    }

    /// Simulate a battle with an explicit seed.
    ///
    /// # Errors
    /// Same as [`BattleEngine::simulate_battle`].
    pub fn simulate_battle_seeded(
        &self,
        blue: &[TeamSlot],
        red: &[TeamSlot],
        roster: &HeroRoster,
        seed: u64,
    ) -> Result<BattleResult> {
        let battle = Battle::new(blue, red, roster, self.config.clone(), seed)?;
        Ok(battle.into_result())
    }

    /// Start a battle without running it, for callers that step manually.
    ///
    /// # Errors
    /// Same as [`BattleEngine::simulate_battle`].
    pub fn start_battle<'r>(
        &self,
        blue: &[TeamSlot],
        red: &[TeamSlot],
        roster: &'r HeroRoster,
        seed: u64,
    ) -> Result<Battle<'r>> {
        Battle::new(blue, red, roster, self.config.clone(), seed)
    }
}
