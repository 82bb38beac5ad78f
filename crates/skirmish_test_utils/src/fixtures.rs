//! Test fixtures and helpers.
//!
//! Pre-built rosters, heroes and teams for consistent testing.

use fixed::types::I32F32;
use skirmish_core::data::{
    AbilityDefinition, AbilityKind, BaseStats, HeroDefinition, HeroRoster, Role, StatScaling,
};
use skirmish_core::team::TeamSlot;

/// The shipped hero roster, embedded at compile time.
pub const STANDARD_ROSTER_RON: &str = include_str!("../../../assets/data/heroes.ron");

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// The shipped roster.
///
/// # Panics
///
/// Panics if the embedded roster file does not parse.
#[must_use]
pub fn standard_roster() -> HeroRoster {
    HeroRoster::from_ron_str("heroes.ron", STANDARD_ROSTER_RON)
        .expect("embedded hero roster must parse")
}

/// Ids of every hero in the shipped roster, in id order.
#[must_use]
pub fn standard_hero_ids() -> Vec<String> {
    standard_roster().iter().map(|h| h.id.clone()).collect()
}

/// Balanced blue team from the shipped roster: tank, sniper, support.
#[must_use]
pub fn standard_blue() -> Vec<TeamSlot> {
    vec![
        TeamSlot::new("vanguard", 0, 1),
        TeamSlot::new("deadeye", 2, 1),
        TeamSlot::new("medic", 3, 2),
    ]
}

/// Balanced red team from the shipped roster: tank, assault, support.
#[must_use]
pub fn standard_red() -> Vec<TeamSlot> {
    vec![
        TeamSlot::new("warden", 0, 2),
        TeamSlot::new("blademaster", 0, 1),
        TeamSlot::new("oracle", 2, 2),
    ]
}

/// Five-hero blue team from the shipped roster.
#[must_use]
pub fn full_blue() -> Vec<TeamSlot> {
    vec![
        TeamSlot::new("vanguard", 0, 1),
        TeamSlot::new("blademaster", 0, 2),
        TeamSlot::new("longbow", 2, 0),
        TeamSlot::new("saboteur", 2, 3),
        TeamSlot::new("medic", 3, 1),
    ]
}

/// Five-hero red team from the shipped roster.
#[must_use]
pub fn full_red() -> Vec<TeamSlot> {
    vec![
        TeamSlot::new("warden", 0, 1),
        TeamSlot::new("raider", 0, 2),
        TeamSlot::new("technomancer", 1, 1),
        TeamSlot::new("deadeye", 3, 0),
        TeamSlot::new("oracle", 3, 3),
    ]
}

/// A team of `ids` placed left to right along rows, level 1.
///
/// # Panics
///
/// Panics if more than 16 ids are given.
#[must_use]
pub fn team_of(ids: &[&str]) -> Vec<TeamSlot> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let i = i32::try_from(i).expect("team index fits in i32");
            TeamSlot::new(*id, i / 4, i % 4)
        })
        .collect()
}

/// Builder for ad-hoc hero definitions.
///
/// Defaults to a 1000 health, 50 damage melee tank with no abilities.
#[derive(Debug, Clone)]
pub struct HeroBuilder {
    hero: HeroDefinition,
}

impl HeroBuilder {
    /// Start a hero with the given id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            hero: HeroDefinition {
                id: id.to_string(),
                name: id.to_string(),
                role: Role::Tank,
                stats: BaseStats {
                    health: 1000,
                    shield: 0,
                    energy: 100,
                    movement_speed: 3,
                    attack_damage: 50,
                    armor: 0,
                    magic_resist: 0,
                    attack_range: 1,
                    attack_speed: 100,
                },
                scaling: StatScaling::default(),
                abilities: Vec::new(),
            },
        }
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.hero.role = role;
        self
    }

    /// Set base health.
    #[must_use]
    pub fn health(mut self, health: u32) -> Self {
        self.hero.stats.health = health;
        self
    }

    /// Set base shield.
    #[must_use]
    pub fn shield(mut self, shield: u32) -> Self {
        self.hero.stats.shield = shield;
        self
    }

    /// Set auto-attack damage.
    #[must_use]
    pub fn damage(mut self, damage: u32) -> Self {
        self.hero.stats.attack_damage = damage;
        self
    }

    /// Set attack range.
    #[must_use]
    pub fn range(mut self, range: u32) -> Self {
        self.hero.stats.attack_range = range;
        self
    }

    /// Set per-level scaling.
    #[must_use]
    pub fn scaling(mut self, scaling: StatScaling) -> Self {
        self.hero.scaling = scaling;
        self
    }

    /// Add a damaging active ability.
    #[must_use]
    pub fn strike(self, id: &str, damage: u32, cooldown_ms: u64) -> Self {
        self.ability(ability(id, AbilityKind::Active, Some(damage), None, cooldown_ms, 0))
    }

    /// Add a healing active ability.
    #[must_use]
    pub fn heal(self, id: &str, healing: u32, cooldown_ms: u64) -> Self {
        self.ability(ability(id, AbilityKind::Active, None, Some(healing), cooldown_ms, 0))
    }

    /// Add a damaging ultimate.
    #[must_use]
    pub fn ultimate(self, id: &str, damage: u32, cast_time_ms: u64) -> Self {
        self.ability(ability(id, AbilityKind::Ultimate, Some(damage), None, 0, cast_time_ms))
    }

    /// Add a healing ultimate.
    #[must_use]
    pub fn healing_ultimate(self, id: &str, healing: u32, cast_time_ms: u64) -> Self {
        self.ability(ability(id, AbilityKind::Ultimate, None, Some(healing), 0, cast_time_ms))
    }

    /// Add an arbitrary ability.
    #[must_use]
    pub fn ability(mut self, ability: AbilityDefinition) -> Self {
        self.hero.abilities.push(ability);
        self
    }

    /// Finish the hero.
    #[must_use]
    pub fn build(self) -> HeroDefinition {
        self.hero
    }
}

fn ability(
    id: &str,
    kind: AbilityKind,
    damage: Option<u32>,
    healing: Option<u32>,
    cooldown_ms: u64,
    cast_time_ms: u64,
) -> AbilityDefinition {
    AbilityDefinition {
        id: id.to_string(),
        name: id.to_string(),
        kind,
        cooldown_ms,
        energy_cost: 0,
        range: 0,
        damage,
        healing,
        area_radius: None,
        cast_time_ms,
    }
}
