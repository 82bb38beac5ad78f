//! Damage and healing resolution.
//!
//! Damage flows shield-first, then into health, and neither pool ever drops
//! below zero. Healing never exceeds missing health. These functions mutate
//! only the receiving unit; crediting the source (damage dealt, kills,
//! healing done) and logging are the caller's job.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::data::Role;
use crate::math::{percent, Fixed};
use crate::unit::BattleUnit;

/// Outgoing damage multiplier for a role.
///
/// Applied to every damage source: auto-attacks, abilities and ultimates.
#[must_use]
pub fn role_modifier(role: Role) -> Fixed {
    match role {
        Role::Assault => percent(110),
        Role::Specialist => percent(115),
        Role::Support | Role::Tank | Role::Sniper => Fixed::ONE,
    }
}

/// Outgoing damage of `base` for an attacker of `role`.
#[must_use]
pub fn outgoing_damage(base: Fixed, role: Role) -> Fixed {
    base * role_modifier(role)
}

/// What a single damage application did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage soaked by the shield.
    pub absorbed: Fixed,
    /// Damage that reached health.
    pub health_lost: Fixed,
    /// The hit reduced health to zero.
    pub killed: bool,
}

impl DamageOutcome {
    /// Total damage the target actually lost across both pools.
    #[must_use]
    pub fn total(&self) -> Fixed {
        self.absorbed + self.health_lost
    }
}

/// Apply `amount` damage to `target` at simulated time `now`.
///
/// Records `damage_taken` and `last_damaged_at` on the target and marks it
/// dead when health reaches zero. Damaging a dead unit does nothing.
pub fn apply_damage(target: &mut BattleUnit, amount: Fixed, now: u64) -> DamageOutcome {
    if !target.is_alive() || amount <= Fixed::ZERO {
        return DamageOutcome {
            absorbed: Fixed::ZERO,
            health_lost: Fixed::ZERO,
            killed: false,
        };
    }

    let absorbed = amount.min(target.shield);
    target.shield -= absorbed;

    let health_lost = (amount - absorbed).min(target.health);
    target.health -= health_lost;

    target.stats.damage_taken = target.stats.damage_taken.saturating_add(absorbed + health_lost);
    target.last_damaged_at = Some(now);

    let killed = target.health <= Fixed::ZERO;
    if killed {
        target.health = Fixed::ZERO;
        target.mark_dead();
    }

    DamageOutcome {
        absorbed,
        health_lost,
        killed,
    }
}

/// Heal `target` by up to `amount`, capped at its missing health.
///
/// Returns the amount actually applied. Dead units cannot be healed.
pub fn apply_healing(target: &mut BattleUnit, amount: Fixed) -> Fixed {
    if !target.is_alive() || amount <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    let applied = amount.min(target.max_health - target.health);
    target.health += applied;
    applied
}

/// Roll a critical hit with `chance_percent` probability.
///
/// Consumes exactly one value from `rng` regardless of the chance, so the
/// random stream stays aligned across configs.
pub fn roll_critical(rng: &mut ChaCha8Rng, chance_percent: u32) -> bool {
    rng.gen_range(0..100u32) < chance_percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BaseStats, HeroDefinition, HeroRoster, StatScaling};
    use crate::team::{Team, TeamSlot};
    use rand::SeedableRng;

    fn unit(health: u32, shield: u32) -> BattleUnit {
        let roster: HeroRoster = vec![HeroDefinition {
            id: "dummy".to_string(),
            name: String::new(),
            role: Role::Tank,
            stats: BaseStats {
                health,
                shield,
                energy: 0,
                movement_speed: 0,
                attack_damage: 10,
                armor: 0,
                magic_resist: 0,
                attack_range: 1,
                attack_speed: 100,
            },
            scaling: StatScaling::default(),
            abilities: Vec::new(),
        }]
        .into();
        BattleUnit::from_slot(&TeamSlot::new("dummy", 0, 0), Team::Red, 0, &roster).unwrap()
    }

    #[test]
    fn test_role_modifiers() {
        assert_eq!(role_modifier(Role::Assault), percent(110));
        assert_eq!(role_modifier(Role::Specialist), percent(115));
        assert_eq!(role_modifier(Role::Tank), Fixed::ONE);
        assert_eq!(role_modifier(Role::Support), Fixed::ONE);
        assert_eq!(role_modifier(Role::Sniper), Fixed::ONE);
    }

    #[test]
    fn test_shield_absorbs_first() {
        let mut target = unit(100, 50);
        let outcome = apply_damage(&mut target, Fixed::from_num(30), 100);
        assert_eq!(target.shield, Fixed::from_num(20));
        assert_eq!(target.health, Fixed::from_num(100));
        assert_eq!(outcome.absorbed, Fixed::from_num(30));
        assert_eq!(outcome.health_lost, Fixed::ZERO);
        assert_eq!(target.last_damaged_at, Some(100));
    }

    #[test]
    fn test_overflow_spills_into_health() {
        let mut target = unit(100, 50);
        let outcome = apply_damage(&mut target, Fixed::from_num(80), 0);
        assert_eq!(target.shield, Fixed::ZERO);
        assert_eq!(target.health, Fixed::from_num(70));
        assert_eq!(outcome.total(), Fixed::from_num(80));
        assert_eq!(target.stats.damage_taken, Fixed::from_num(80));
    }

    #[test]
    fn test_lethal_damage_clamps_and_kills() {
        let mut target = unit(100, 10);
        target.begin_cast(900);
        let outcome = apply_damage(&mut target, Fixed::from_num(500), 0);
        assert!(outcome.killed);
        assert_eq!(target.health, Fixed::ZERO);
        assert_eq!(target.shield, Fixed::ZERO);
        assert_eq!(outcome.total(), Fixed::from_num(110));
        assert!(!target.is_alive());
        assert!(!target.is_casting());
    }

    #[test]
    fn test_dead_units_take_no_damage() {
        let mut target = unit(10, 0);
        apply_damage(&mut target, Fixed::from_num(10), 0);
        let again = apply_damage(&mut target, Fixed::from_num(10), 100);
        assert!(!again.killed);
        assert_eq!(again.total(), Fixed::ZERO);
        assert_eq!(target.last_damaged_at, Some(0));
    }

    #[test]
    fn test_no_overheal() {
        let mut target = unit(100, 0);
        apply_damage(&mut target, Fixed::from_num(30), 0);
        let healed = apply_healing(&mut target, Fixed::from_num(120));
        assert_eq!(healed, Fixed::from_num(30));
        assert_eq!(target.health, target.max_health);

        assert_eq!(apply_healing(&mut target, Fixed::from_num(50)), Fixed::ZERO);
    }

    #[test]
    fn test_roll_critical_is_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        let rolls_a: Vec<_> = (0..64).map(|_| roll_critical(&mut a, 15)).collect();
        let rolls_b: Vec<_> = (0..64).map(|_| roll_critical(&mut b, 15)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_roll_critical_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((0..100).all(|_| !roll_critical(&mut rng, 0)));
        assert!((0..100).all(|_| roll_critical(&mut rng, 100)));
    }
}
