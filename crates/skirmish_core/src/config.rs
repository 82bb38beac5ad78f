//! Engine tuning parameters.
//!
//! Every field has a default matching the standard ruleset, so a RON
//! document only needs to name the values it overrides.
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     max_duration_ms: 60000,
//!     critical_chance_percent: 25,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::math::{fixed_decimal, Fixed};

/// Upper bound on `critical_multiplier_percent`.
pub const MAX_CRITICAL_MULTIPLIER_PERCENT: u32 = 1000;

/// Tuning parameters for the battle loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulated milliseconds per tick.
    pub tick_ms: u64,
    /// Battle time cap in simulated milliseconds.
    pub max_duration_ms: u64,
    /// Ultimate charge gained every tick.
    #[serde(with = "fixed_decimal")]
    pub ultimate_charge_per_tick: Fixed,
    /// Ultimate charge gained per auto-attack.
    #[serde(with = "fixed_decimal")]
    pub auto_attack_charge: Fixed,
    /// Delay between auto-attacks.
    pub auto_attack_interval_ms: u64,
    /// Quiescence required after damage before shields regenerate.
    pub shield_regen_delay_ms: u64,
    /// Shield regenerated per tick once quiescent.
    #[serde(with = "fixed_decimal")]
    pub shield_regen_per_tick: Fixed,
    /// Chance of a critical auto-attack, in percent.
    pub critical_chance_percent: u32,
    /// Critical damage multiplier, in percent.
    pub critical_multiplier_percent: u32,
    /// Units with a longer attack range ignore front-line priority.
    pub ranged_threshold: u32,
    /// Healing abilities wait until an ally drops below this health percent.
    pub heal_threshold_percent: u32,
    /// Seed used by [`crate::engine::BattleEngine::simulate_battle`].
    pub default_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            max_duration_ms: 180_000,
            ultimate_charge_per_tick: Fixed::from_num(1) / Fixed::from_num(2),
            auto_attack_charge: Fixed::from_num(2),
            auto_attack_interval_ms: 1000,
            shield_regen_delay_ms: 3000,
            shield_regen_per_tick: Fixed::from_num(2),
            critical_chance_percent: 15,
            critical_multiplier_percent: 150,
            ranged_threshold: 3,
            heal_threshold_percent: 70,
            default_seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from RON text, then validate it.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| BattleError::DataParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(BattleError::InvalidConfig("tick_ms must be positive".into()));
        }
        if self.max_duration_ms == 0 || self.max_duration_ms % self.tick_ms != 0 {
            return Err(BattleError::InvalidConfig(format!(
                "max_duration_ms ({}) must be a positive multiple of tick_ms ({})",
                self.max_duration_ms, self.tick_ms
            )));
        }
        if self.auto_attack_interval_ms == 0 {
            return Err(BattleError::InvalidConfig(
                "auto_attack_interval_ms must be positive".into(),
            ));
        }
        if self.critical_chance_percent > 100 {
            return Err(BattleError::InvalidConfig(format!(
                "critical_chance_percent ({}) exceeds 100",
                self.critical_chance_percent
            )));
        }
        if self.heal_threshold_percent > 100 {
            return Err(BattleError::InvalidConfig(format!(
                "heal_threshold_percent ({}) exceeds 100",
                self.heal_threshold_percent
            )));
        }
        if self.critical_multiplier_percent > MAX_CRITICAL_MULTIPLIER_PERCENT {
            return Err(BattleError::InvalidConfig(format!(
                "critical_multiplier_percent ({}) exceeds {MAX_CRITICAL_MULTIPLIER_PERCENT}",
                self.critical_multiplier_percent
            )));
        }
        let negative = [
            ("ultimate_charge_per_tick", self.ultimate_charge_per_tick),
            ("auto_attack_charge", self.auto_attack_charge),
            ("shield_regen_per_tick", self.shield_regen_per_tick),
        ];
        if let Some((name, _)) = negative.iter().find(|(_, v)| *v < Fixed::ZERO) {
            return Err(BattleError::InvalidConfig(format!("{name} must not be negative")));
        }
        Ok(())
    }

    /// Number of ticks the time cap allows.
    #[must_use]
    pub const fn max_ticks(&self) -> u64 {
        self.max_duration_ms / self.tick_ms
    }
}
