//! Hero and ability definitions for data-driven rosters.

use serde::{Deserialize, Serialize};

/// Largest stat or ability amount a unit may carry, after level scaling.
///
/// Keeps pools, critical hits and role bonuses inside [`crate::math::Fixed`]
/// range.
pub const MAX_STAT_VALUE: u32 = 100_000_000;

/// Combat role of a hero.
///
/// Roles drive the flat outgoing damage modifier applied by the damage
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Damage-focused frontliner.
    Assault,
    /// Healer or buffer.
    Support,
    /// Durable frontliner.
    Tank,
    /// Long-range damage dealer.
    Sniper,
    /// Utility hero with a damage bonus.
    Specialist,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Assault => "assault",
            Role::Support => "support",
            Role::Tank => "tank",
            Role::Sniper => "sniper",
            Role::Specialist => "specialist",
        };
        f.write_str(name)
    }
}

/// Ability category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityKind {
    /// Basic attack flavour; auto-attacks cover it.
    Basic,
    /// Cooldown-gated ability scanned every tick.
    Active,
    /// Charge-gated strongest ability.
    Ultimate,
    /// Always-on effect; never cast.
    Passive,
}

/// Base statistics for a hero at level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    /// Maximum health points.
    pub health: u32,
    /// Maximum shield points.
    #[serde(default)]
    pub shield: u32,
    /// Maximum energy.
    #[serde(default)]
    pub energy: u32,
    /// Movement speed (grid content only).
    #[serde(default)]
    pub movement_speed: u32,
    /// Damage of one auto-attack.
    pub attack_damage: u32,
    /// Physical mitigation rating.
    #[serde(default)]
    pub armor: u32,
    /// Magical mitigation rating.
    #[serde(default)]
    pub magic_resist: u32,
    /// Attack range in tiles. Above the engine's ranged threshold the hero
    /// may target any enemy.
    pub attack_range: u32,
    /// Attack speed in percent of the standard auto-attack cadence.
    #[serde(default = "default_attack_speed")]
    pub attack_speed: u32,
}

const fn default_attack_speed() -> u32 {
    100
}

/// Per-level growth, in percent of the base stat per level above 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatScaling {
    /// Health growth per level.
    pub health: u32,
    /// Shield growth per level.
    pub shield: u32,
    /// Energy growth per level.
    pub energy: u32,
    /// Attack damage growth per level.
    pub attack_damage: u32,
    /// Armor growth per level.
    pub armor: u32,
    /// Magic resist growth per level.
    pub magic_resist: u32,
}

/// A single ability in a hero's kit.
///
/// # Example RON
///
/// ```ron
/// AbilityDefinition(
///     id: "mend",
///     name: "Mend",
///     kind: active,
///     cooldown_ms: 6000,
///     energy_cost: 30,
///     range: 4,
///     healing: Some(120),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Identifier, unique within the hero's kit.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Category.
    pub kind: AbilityKind,
    /// Cooldown in simulated milliseconds.
    #[serde(default)]
    pub cooldown_ms: u64,
    /// Energy cost (content only).
    #[serde(default)]
    pub energy_cost: u32,
    /// Cast range in tiles (content only).
    #[serde(default)]
    pub range: u32,
    /// Damage dealt to the selected enemy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<u32>,
    /// Healing applied to the selected ally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<u32>,
    /// Area radius in tiles (content only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_radius: Option<u32>,
    /// Cast lock duration in simulated milliseconds.
    #[serde(default)]
    pub cast_time_ms: u64,
}

impl AbilityDefinition {
    /// Declared damage, treating `Some(0)` as no damage.
    #[must_use]
    pub fn damage_amount(&self) -> Option<u32> {
        self.damage.filter(|&d| d > 0)
    }

    /// Declared healing, treating `Some(0)` as no healing.
    #[must_use]
    pub fn healing_amount(&self) -> Option<u32> {
        self.healing.filter(|&h| h > 0)
    }

    /// The effect this ability has when cast.
    ///
    /// Damage takes precedence over healing when both are declared.
    #[must_use]
    pub fn effect(&self) -> Option<AbilityEffect> {
        self.damage_amount()
            .map(AbilityEffect::Damage)
            .or_else(|| self.healing_amount().map(AbilityEffect::Heal))
    }
}

/// Resolved effect of casting an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityEffect {
    /// Damage the selected enemy.
    Damage(u32),
    /// Heal the selected ally.
    Heal(u32),
}

/// Data-driven hero definition.
///
/// # Example RON
///
/// ```ron
/// HeroDefinition(
///     id: "vanguard",
///     name: "Vanguard",
///     role: tank,
///     stats: BaseStats(
///         health: 1200,
///         shield: 300,
///         attack_damage: 45,
///         attack_range: 1,
///     ),
///     scaling: StatScaling(health: 8, attack_damage: 5),
///     abilities: [],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroDefinition {
    /// Unique identifier used by team slots.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Combat role.
    pub role: Role,
    /// Level 1 statistics.
    pub stats: BaseStats,
    /// Per-level growth.
    #[serde(default)]
    pub scaling: StatScaling,
    /// Ordered ability kit.
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

impl HeroDefinition {
    /// The first ultimate in the kit, if any.
    #[must_use]
    pub fn ultimate(&self) -> Option<&AbilityDefinition> {
        self.abilities
            .iter()
            .find(|a| a.kind == AbilityKind::Ultimate)
    }

    /// Active abilities in declared order.
    pub fn active_abilities(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities
            .iter()
            .filter(|a| a.kind == AbilityKind::Active)
    }

    /// Look up an ability by id.
    #[must_use]
    pub fn ability(&self, ability_id: &str) -> Option<&AbilityDefinition> {
        self.abilities.iter().find(|a| a.id == ability_id)
    }
}
