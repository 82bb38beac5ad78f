//! Runtime combat units.
//!
//! A [`BattleUnit`] is the mutable, per-battle instance of a hero. It is
//! created from a [`TeamSlot`] and owned by exactly one battle.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{HeroRoster, Role, MAX_STAT_VALUE};
use crate::error::{BattleError, Result};
use crate::math::{fixed_serde, Fixed, HUNDRED};
use crate::team::{GridPosition, Team, TeamSlot};

/// Identifies a unit within a battle: its side and slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    /// Owning side.
    pub team: Team,
    /// Index into the side's slot list.
    pub slot: usize,
}

impl UnitId {
    /// Create a unit id.
    #[must_use]
    pub const fn new(team: Team, slot: usize) -> Self {
        Self { team, slot }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.team, self.slot)
    }
}

/// Life and action-lock flags.
///
/// `alive` and `dead` are always complementary. `stunned` is honoured by
/// the action resolver but no shipped effect sets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStatus {
    /// Unit can act and be targeted.
    pub alive: bool,
    /// Unit has been eliminated.
    pub dead: bool,
    /// Unit is locked by an ultimate cast.
    pub casting: bool,
    /// Unit may not use abilities or auto-attack.
    pub stunned: bool,
}

impl Default for UnitStatus {
    fn default() -> Self {
        Self {
            alive: true,
            dead: false,
            casting: false,
            stunned: false,
        }
    }
}

/// Per-unit performance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Damage this unit dealt, including the shield-absorbed portion.
    #[serde(with = "fixed_serde")]
    pub damage_dealt: Fixed,
    /// Damage this unit received, including the shield-absorbed portion.
    #[serde(with = "fixed_serde")]
    pub damage_taken: Fixed,
    /// Health this unit restored to allies (or itself).
    #[serde(with = "fixed_serde")]
    pub healing_done: Fixed,
    /// Enemies this unit eliminated.
    pub kills: u32,
}

/// A hero instance taking part in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleUnit {
    /// Side and slot.
    pub id: UnitId,
    /// Roster id of the hero this unit was built from.
    pub hero_id: String,
    /// Combat role.
    pub role: Role,
    /// Grid placement on the owning side.
    pub position: GridPosition,
    /// Current health.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Maximum health.
    #[serde(with = "fixed_serde")]
    pub max_health: Fixed,
    /// Current shield.
    #[serde(with = "fixed_serde")]
    pub shield: Fixed,
    /// Maximum shield.
    #[serde(with = "fixed_serde")]
    pub max_shield: Fixed,
    /// Current energy. Carried, not consumed.
    #[serde(with = "fixed_serde")]
    pub energy: Fixed,
    /// Maximum energy.
    #[serde(with = "fixed_serde")]
    pub max_energy: Fixed,
    /// Damage of one auto-attack before role modifier.
    #[serde(with = "fixed_serde")]
    pub attack_damage: Fixed,
    /// Attack range in tiles.
    pub attack_range: u32,
    /// Physical mitigation rating (not applied to damage).
    #[serde(with = "fixed_serde")]
    pub armor: Fixed,
    /// Magical mitigation rating (not applied to damage).
    #[serde(with = "fixed_serde")]
    pub magic_resist: Fixed,
    /// Ultimate charge in `[0, 100]`.
    #[serde(with = "fixed_serde")]
    pub ultimate_charge: Fixed,
    /// Life and lock flags.
    pub status: UnitStatus,
    /// Simulated time at which the current cast lock ends.
    pub casting_until: Option<u64>,
    /// Ability id to cooldown expiry in simulated ms.
    pub cooldowns: BTreeMap<String, u64>,
    /// Earliest simulated time of the next auto-attack.
    pub next_auto_attack_at: u64,
    /// Simulated time of the last damage taken.
    pub last_damaged_at: Option<u64>,
    /// Performance counters.
    pub stats: UnitStats,
}

impl BattleUnit {
    /// Instantiate a unit for `slot` from the roster.
    ///
    /// Stats are scaled by the slot level; level 1 copies base stats
    /// unchanged. Every ability starts off cooldown.
    ///
    /// # Errors
    /// - [`BattleError::HeroNotFound`] if the roster has no hero with the
    ///   slot's id
    /// - [`BattleError::InvalidRoster`] if a scaled stat or an ability amount
    ///   exceeds [`MAX_STAT_VALUE`]
    pub fn from_slot(slot: &TeamSlot, team: Team, index: usize, roster: &HeroRoster) -> Result<Self> {
        let hero = roster.require(&slot.hero_id)?;
        let stats = &hero.stats;
        let scaling = &hero.scaling;
        let level = slot.level;

        let scale = |name: &str, base: u32, pct: u32| {
            level_scaled(base, pct, level).ok_or_else(|| {
                BattleError::InvalidRoster(vec![format!(
                    "hero '{}' {name} exceeds {MAX_STAT_VALUE} at level {level}",
                    hero.id
                )])
            })
        };

        if let Some(ability) = hero.abilities.iter().find(|a| {
            a.damage.unwrap_or(0) > MAX_STAT_VALUE || a.healing.unwrap_or(0) > MAX_STAT_VALUE
        }) {
            return Err(BattleError::InvalidRoster(vec![format!(
                "hero '{}' ability '{}' exceeds {MAX_STAT_VALUE}",
                hero.id, ability.id
            )]));
        }

        let max_health = scale("health", stats.health, scaling.health)?;
        let max_shield = scale("shield", stats.shield, scaling.shield)?;
        let max_energy = scale("energy", stats.energy, scaling.energy)?;
        let attack_damage = scale("attack_damage", stats.attack_damage, scaling.attack_damage)?;
        let armor = scale("armor", stats.armor, scaling.armor)?;
        let magic_resist = scale("magic_resist", stats.magic_resist, scaling.magic_resist)?;

        Ok(Self {
            id: UnitId::new(team, index),
            hero_id: hero.id.clone(),
            role: hero.role,
            position: slot.position,
            health: max_health,
            max_health,
            shield: max_shield,
            max_shield,
            energy: max_energy,
            max_energy,
            attack_damage,
            attack_range: stats.attack_range,
            armor,
            magic_resist,
            ultimate_charge: Fixed::ZERO,
            status: UnitStatus::default(),
            casting_until: None,
            cooldowns: BTreeMap::new(),
            next_auto_attack_at: 0,
            last_damaged_at: None,
            stats: UnitStats::default(),
        })
    }

    /// Check if the unit can act and be targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.status.alive
    }

    /// Check if the unit is under a cast lock.
    #[must_use]
    pub const fn is_casting(&self) -> bool {
        self.status.casting
    }

    /// Check if the unit is stunned.
    #[must_use]
    pub const fn is_stunned(&self) -> bool {
        self.status.stunned
    }

    /// Check if the unit ignores front-line priority.
    #[must_use]
    pub const fn is_ranged(&self, ranged_threshold: u32) -> bool {
        self.attack_range > ranged_threshold
    }

    /// `(health + shield) / (max_health + max_shield)`.
    #[must_use]
    pub fn effective_health_ratio(&self) -> Fixed {
        crate::math::ratio(
            self.health.saturating_add(self.shield),
            self.max_health.saturating_add(self.max_shield),
        )
    }

    /// `health / max_health`.
    #[must_use]
    pub fn health_ratio(&self) -> Fixed {
        crate::math::ratio(self.health, self.max_health)
    }

    /// Check if health is below its maximum.
    #[must_use]
    pub fn is_injured(&self) -> bool {
        self.health < self.max_health
    }

    /// Check if the ability is off cooldown at `now`.
    #[must_use]
    pub fn is_ready(&self, ability_id: &str, now: u64) -> bool {
        self.cooldowns
            .get(ability_id)
            .map_or(true, |&expiry| expiry <= now)
    }

    /// Add ultimate charge, capped at 100.
    pub fn gain_charge(&mut self, amount: Fixed) {
        self.ultimate_charge = self.ultimate_charge.saturating_add(amount).min(HUNDRED);
    }

    /// Enter a cast lock ending at `until`.
    pub fn begin_cast(&mut self, until: u64) {
        self.status.casting = true;
        self.casting_until = Some(until);
    }

    /// Leave any cast lock.
    pub fn end_cast(&mut self) {
        self.status.casting = false;
        self.casting_until = None;
    }

    /// Mark the unit as eliminated.
    pub fn mark_dead(&mut self) {
        self.status.alive = false;
        self.status.dead = true;
        self.end_cast();
    }
}

/// Both sides' units, indexed by [`UnitId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Battlefield {
    /// Blue units in slot order.
    pub blue: Vec<BattleUnit>,
    /// Red units in slot order.
    pub red: Vec<BattleUnit>,
}

impl Battlefield {
    /// Instantiate both teams from the roster.
    ///
    /// # Errors
    /// Returns [`crate::error::BattleError::HeroNotFound`] for the first slot
    /// whose hero is missing.
    pub fn from_slots(blue: &[TeamSlot], red: &[TeamSlot], roster: &HeroRoster) -> Result<Self> {
        let build = |slots: &[TeamSlot], team| {
            slots
                .iter()
                .enumerate()
                .map(|(index, slot)| BattleUnit::from_slot(slot, team, index, roster))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            blue: build(blue, Team::Blue)?,
            red: build(red, Team::Red)?,
        })
    }

    /// Units of one side.
    #[must_use]
    pub fn side(&self, team: Team) -> &[BattleUnit] {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// Mutable units of one side.
    pub fn side_mut(&mut self, team: Team) -> &mut [BattleUnit] {
        match team {
            Team::Blue => &mut self.blue,
            Team::Red => &mut self.red,
        }
    }

    /// Look up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&BattleUnit> {
        self.side(id.team).get(id.slot)
    }

    /// Look up a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut BattleUnit> {
        self.side_mut(id.team).get_mut(id.slot)
    }

    /// Number of living units on a side.
    #[must_use]
    pub fn living(&self, team: Team) -> usize {
        self.side(team).iter().filter(|u| u.is_alive()).count()
    }

    /// Acting order: blue by slot, then red by slot.
    #[must_use]
    pub fn turn_order(&self) -> Vec<UnitId> {
        self.blue
            .iter()
            .chain(self.red.iter())
            .map(|u| u.id)
            .collect()
    }

    /// Every unit, blue first.
    pub fn iter(&self) -> impl Iterator<Item = &BattleUnit> {
        self.blue.iter().chain(self.red.iter())
    }
}

/// `base * (100 + pct * (level - 1)) / 100` as a fixed-point value.
///
/// Computed in integers, so only the final value has to fit. Returns `None`
/// when the result exceeds [`MAX_STAT_VALUE`].
#[must_use]
pub fn level_scaled(base: u32, pct_per_level: u32, level: u32) -> Option<Fixed> {
    let growth = u64::from(pct_per_level) * u64::from(level.saturating_sub(1));
    let scaled = u64::from(base).checked_mul(100 + growth)?;
    let (whole, hundredths) = (scaled / 100, scaled % 100);
    if whole > u64::from(MAX_STAT_VALUE) {
        return None;
    }
    Some(Fixed::from_num(whole) + Fixed::from_num(hundredths) / HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AbilityDefinition, AbilityKind, BaseStats, HeroDefinition, StatScaling};

    fn roster() -> HeroRoster {
        vec![HeroDefinition {
            id: "knight".to_string(),
            name: "Knight".to_string(),
            role: Role::Tank,
            stats: BaseStats {
                health: 1000,
                shield: 200,
                energy: 100,
                movement_speed: 2,
                attack_damage: 50,
                armor: 30,
                magic_resist: 20,
                attack_range: 1,
                attack_speed: 100,
            },
            scaling: StatScaling {
                health: 10,
                attack_damage: 5,
                ..Default::default()
            },
            abilities: Vec::new(),
        }]
        .into()
    }

    #[test]
    fn test_from_slot_copies_base_stats() {
        let unit = BattleUnit::from_slot(&TeamSlot::new("knight", 0, 1), Team::Red, 2, &roster())
            .unwrap();
        assert_eq!(unit.id, UnitId::new(Team::Red, 2));
        assert_eq!(unit.health, Fixed::from_num(1000));
        assert_eq!(unit.max_health, unit.health);
        assert_eq!(unit.shield, Fixed::from_num(200));
        assert_eq!(unit.attack_damage, Fixed::from_num(50));
        assert_eq!(unit.ultimate_charge, Fixed::ZERO);
        assert!(unit.is_alive());
        assert!(unit.cooldowns.is_empty());
        assert_eq!(unit.next_auto_attack_at, 0);
    }

    #[test]
    fn test_from_slot_scales_by_level() {
        let slot = TeamSlot::new("knight", 0, 0).with_level(3);
        let unit = BattleUnit::from_slot(&slot, Team::Blue, 0, &roster()).unwrap();
        assert_eq!(unit.max_health, Fixed::from_num(1200));
        assert_eq!(unit.attack_damage, Fixed::from_num(55));
        // No shield scaling declared
        assert_eq!(unit.max_shield, Fixed::from_num(200));
    }

    #[test]
    fn test_from_slot_unknown_hero() {
        let result = BattleUnit::from_slot(&TeamSlot::new("ghost", 0, 0), Team::Blue, 0, &roster());
        assert_eq!(result, Err(BattleError::HeroNotFound("ghost".to_string())));
    }

    #[test]
    fn test_charge_is_capped() {
        let mut unit =
            BattleUnit::from_slot(&TeamSlot::new("knight", 0, 0), Team::Blue, 0, &roster()).unwrap();
        unit.gain_charge(Fixed::from_num(99));
        unit.gain_charge(Fixed::from_num(2));
        assert_eq!(unit.ultimate_charge, HUNDRED);
    }

    #[test]
    fn test_mark_dead_clears_cast() {
        let mut unit =
            BattleUnit::from_slot(&TeamSlot::new("knight", 0, 0), Team::Blue, 0, &roster()).unwrap();
        unit.begin_cast(500);
        unit.mark_dead();
        assert!(!unit.status.alive);
        assert!(unit.status.dead);
        assert!(!unit.is_casting());
        assert_eq!(unit.casting_until, None);
    }

    #[test]
    fn test_battlefield_lookup_and_order() {
        let slots = vec![TeamSlot::new("knight", 0, 0), TeamSlot::new("knight", 0, 1)];
        let mut field = Battlefield::from_slots(&slots, &slots[..1], &roster()).unwrap();

        assert_eq!(
            field.turn_order(),
            vec![
                UnitId::new(Team::Blue, 0),
                UnitId::new(Team::Blue, 1),
                UnitId::new(Team::Red, 0),
            ]
        );
        assert!(field.get(UnitId::new(Team::Red, 1)).is_none());

        field.get_mut(UnitId::new(Team::Blue, 1)).unwrap().mark_dead();
        assert_eq!(field.living(Team::Blue), 1);
        assert_eq!(field.living(Team::Red), 1);
    }

    #[test]
    fn test_battlefield_missing_hero() {
        let blue = vec![TeamSlot::new("knight", 0, 0)];
        let red = vec![TeamSlot::new("nobody", 0, 0)];
        assert_eq!(
            Battlefield::from_slots(&blue, &red, &roster()),
            Err(BattleError::HeroNotFound("nobody".to_string()))
        );
    }

    #[test]
    fn test_cooldown_readiness() {
        let mut unit =
            BattleUnit::from_slot(&TeamSlot::new("knight", 0, 0), Team::Blue, 0, &roster()).unwrap();
        assert!(unit.is_ready("bash", 0));
        unit.cooldowns.insert("bash".to_string(), 3000);
        assert!(!unit.is_ready("bash", 2900));
        assert!(unit.is_ready("bash", 3000));
    }

    fn giant(health: u32, health_scaling: u32) -> HeroRoster {
        let mut hero = roster().require("knight").unwrap().clone();
        hero.id = "giant".to_string();
        hero.stats.health = health;
        hero.scaling.health = health_scaling;
        vec![hero].into()
    }

    #[test]
    fn test_level_scaled_keeps_fractions() {
        assert_eq!(level_scaled(5, 10, 2), Some(Fixed::from_num(11) / Fixed::from_num(2)));
        assert_eq!(level_scaled(7, 0, 30), Some(Fixed::from_num(7)));
        assert_eq!(level_scaled(u32::MAX, u32::MAX, 30), None);
    }

    #[test]
    fn test_large_stats_scale_without_overflow() {
        let slot = TeamSlot::new("giant", 0, 0).with_level(30);
        let unit = BattleUnit::from_slot(&slot, Team::Blue, 0, &giant(1_000_000, 100)).unwrap();
        assert_eq!(unit.max_health, Fixed::from_num(30_000_000));
        assert_eq!(unit.effective_health_ratio(), Fixed::ONE);
    }

    #[test]
    fn test_out_of_range_stats_are_rejected() {
        let base = TeamSlot::new("giant", 0, 0);
        let high = base.clone().with_level(30);

        for (slot, roster) in [
            (&base, giant(u32::MAX, 0)),
            (&high, giant(1_000_000, u32::MAX)),
            (&high, giant(MAX_STAT_VALUE, 100)),
        ] {
            assert!(matches!(
                BattleUnit::from_slot(slot, Team::Blue, 0, &roster),
                Err(BattleError::InvalidRoster(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_ability_is_rejected() {
        let mut hero = roster().require("knight").unwrap().clone();
        hero.abilities.push(AbilityDefinition {
            id: "meteor".to_string(),
            name: String::new(),
            kind: AbilityKind::Ultimate,
            cooldown_ms: 0,
            energy_cost: 0,
            range: 0,
            damage: Some(u32::MAX),
            healing: None,
            area_radius: None,
            cast_time_ms: 0,
        });
        let roster: HeroRoster = vec![hero].into();
        let err = BattleUnit::from_slot(&TeamSlot::new("knight", 0, 0), Team::Blue, 0, &roster)
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidRoster(ref p) if p[0].contains("meteor")));
    }
}
