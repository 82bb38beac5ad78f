//! Per-unit turn resolution.
//!
//! Each living unit gets one turn per tick. A turn first applies passive
//! upkeep, then tries, in priority order, its ultimate, its active
//! abilities and finally an auto-attack. At most one of those happens.
//!
//! Selection is greedy: the first eligible ability in declared order is
//! cast, even if a later one would be a better choice.

use rand_chacha::ChaCha8Rng;

use crate::combat::{apply_damage, apply_healing, outgoing_damage, roll_critical};
use crate::config::EngineConfig;
use crate::data::{AbilityDefinition, AbilityEffect, HeroDefinition};
use crate::log::{ActionKind, CombatAction, CombatLog};
use crate::math::{percent, Fixed, HUNDRED};
use crate::targeting::{select_attack_target, select_heal_target};
use crate::unit::{Battlefield, UnitId};

/// Everything a turn needs besides the battlefield itself.
pub struct TurnContext<'a> {
    /// Engine tuning.
    pub config: &'a EngineConfig,
    /// Current simulated time.
    pub now: u64,
    /// Battle random stream, consumed by critical rolls.
    pub rng: &'a mut ChaCha8Rng,
    /// Combat log to append to.
    pub log: &'a mut CombatLog,
}

/// Resolve one turn for `actor`.
///
/// `hero` is the actor's roster definition; without it the unit can only
/// auto-attack. Returns the kind of action taken, or `None` if the unit
/// only performed upkeep.
pub fn resolve_turn(
    field: &mut Battlefield,
    actor: UnitId,
    hero: Option<&HeroDefinition>,
    ctx: &mut TurnContext<'_>,
) -> Option<ActionKind> {
    if !field.get(actor)?.is_alive() {
        return None;
    }
    upkeep(field, actor, ctx);

    if let Some(hero) = hero {
        if let Some(ultimate) = hero.ultimate() {
            if try_ultimate(field, actor, ultimate, ctx) {
                return Some(ActionKind::Ultimate);
            }
        }
        if let Some(kind) = try_active_abilities(field, actor, hero, ctx) {
            return Some(kind);
        }
    }

    try_auto_attack(field, actor, ctx).then_some(ActionKind::AutoAttack)
}

/// Charge accrual, shield regeneration and cast-lock expiry.
fn upkeep(field: &mut Battlefield, actor: UnitId, ctx: &TurnContext<'_>) {
    let Some(unit) = field.get_mut(actor) else {
        return;
    };
    let config = ctx.config;

    unit.gain_charge(config.ultimate_charge_per_tick);

    let quiet = unit
        .last_damaged_at
        .map_or(true, |at| ctx.now.saturating_sub(at) >= config.shield_regen_delay_ms);
    if quiet && unit.shield < unit.max_shield {
        unit.shield = unit
            .shield
            .saturating_add(config.shield_regen_per_tick)
            .min(unit.max_shield);
    }

    if unit.casting_until.is_some_and(|until| ctx.now >= until) {
        unit.end_cast();
    }
}

fn try_ultimate(
    field: &mut Battlefield,
    actor: UnitId,
    ultimate: &AbilityDefinition,
    ctx: &mut TurnContext<'_>,
) -> bool {
    let Some(unit) = field.get(actor) else {
        return false;
    };
    if unit.ultimate_charge < HUNDRED || unit.is_casting() {
        return false;
    }

    let cast = match ultimate.effect() {
        Some(AbilityEffect::Damage(base)) => strike(
            field,
            actor,
            Fixed::from_num(base),
            ActionKind::Ultimate,
            Some(ultimate.id.as_str()),
            false,
            ctx,
        ),
        Some(AbilityEffect::Heal(amount)) => mend(
            field,
            actor,
            Fixed::from_num(amount),
            None,
            ActionKind::Ultimate,
            &ultimate.id,
            ctx,
        ),
        None => false,
    };

    if cast {
        if let Some(unit) = field.get_mut(actor) {
            unit.ultimate_charge = Fixed::ZERO;
            unit.begin_cast(ctx.now.saturating_add(ultimate.cast_time_ms));
        }
    }
    cast
}

fn try_active_abilities(
    field: &mut Battlefield,
    actor: UnitId,
    hero: &HeroDefinition,
    ctx: &mut TurnContext<'_>,
) -> Option<ActionKind> {
    let unit = field.get(actor)?;
    if unit.is_casting() || unit.is_stunned() {
        return None;
    }

    let heal_threshold = percent(ctx.config.heal_threshold_percent);

    for ability in hero.active_abilities() {
        if !field.get(actor)?.is_ready(&ability.id, ctx.now) {
            continue;
        }

        let kind = match ability.effect() {
            Some(AbilityEffect::Heal(amount)) => mend(
                field,
                actor,
                Fixed::from_num(amount),
                Some(heal_threshold),
                ActionKind::Heal,
                &ability.id,
                ctx,
            )
            .then_some(ActionKind::Heal),
            Some(AbilityEffect::Damage(base)) => strike(
                field,
                actor,
                Fixed::from_num(base),
                ActionKind::Ability,
                Some(ability.id.as_str()),
                false,
                ctx,
            )
            .then_some(ActionKind::Ability),
            None => None,
        };

        if let Some(kind) = kind {
            let unit = field.get_mut(actor)?;
            unit.cooldowns
                .insert(ability.id.clone(), ctx.now.saturating_add(ability.cooldown_ms));
            return Some(kind);
        }
    }
    None
}

fn try_auto_attack(field: &mut Battlefield, actor: UnitId, ctx: &mut TurnContext<'_>) -> bool {
    let Some(unit) = field.get(actor) else {
        return false;
    };
    if unit.is_casting() || unit.is_stunned() || ctx.now < unit.next_auto_attack_at {
        return false;
    }
    let base = unit.attack_damage;
    if select_attack_target(unit, field.side(actor.team.opponent()), ctx.config.ranged_threshold)
        .is_none()
    {
        return false;
    }

    let critical = roll_critical(ctx.rng, ctx.config.critical_chance_percent);
    let base = if critical {
        base * percent(ctx.config.critical_multiplier_percent)
    } else {
        base
    };

    let hit = strike(field, actor, base, ActionKind::AutoAttack, None, critical, ctx);
    if hit {
        if let Some(unit) = field.get_mut(actor) {
            unit.next_auto_attack_at =
                ctx.now.saturating_add(ctx.config.auto_attack_interval_ms);
            unit.gain_charge(ctx.config.auto_attack_charge);
        }
    }
    hit
}

/// Damage the actor's preferred enemy. Returns false if there is no target.
fn strike(
    field: &mut Battlefield,
    actor: UnitId,
    base: Fixed,
    kind: ActionKind,
    ability_id: Option<&str>,
    critical: bool,
    ctx: &mut TurnContext<'_>,
) -> bool {
    let Some(unit) = field.get(actor) else {
        return false;
    };
    let enemy_team = actor.team.opponent();
    let Some(slot) = select_attack_target(unit, field.side(enemy_team), ctx.config.ranged_threshold)
    else {
        return false;
    };
    let amount = outgoing_damage(base, unit.role);
    let target = UnitId::new(enemy_team, slot);

    let Some(victim) = field.get_mut(target) else {
        return false;
    };
    let outcome = apply_damage(victim, amount, ctx.now);

    if let Some(unit) = field.get_mut(actor) {
        unit.stats.damage_dealt = unit.stats.damage_dealt.saturating_add(outcome.total());
        if outcome.killed {
            unit.stats.kills += 1;
        }
    }

    ctx.log.push(CombatAction {
        timestamp_ms: ctx.now,
        actor,
        kind,
        target: Some(target),
        ability_id: ability_id.map(str::to_string),
        amount: outcome.total(),
        critical,
    });

    if outcome.killed {
        tracing::trace!(unit = %target, killer = %actor, at = ctx.now, "unit eliminated");
        ctx.log.push(CombatAction {
            timestamp_ms: ctx.now,
            actor: target,
            kind: ActionKind::Death,
            target: Some(actor),
            ability_id: None,
            amount: Fixed::ZERO,
            critical: false,
        });
    }
    true
}

/// Heal the actor's most injured ally. Returns false if nobody qualifies.
///
/// With a `threshold`, the ally must also be below that health ratio.
fn mend(
    field: &mut Battlefield,
    actor: UnitId,
    amount: Fixed,
    threshold: Option<Fixed>,
    kind: ActionKind,
    ability_id: &str,
    ctx: &mut TurnContext<'_>,
) -> bool {
    let allies = field.side(actor.team);
    let Some(slot) = select_heal_target(allies) else {
        return false;
    };
    if threshold.is_some_and(|limit| allies[slot].health_ratio() >= limit) {
        return false;
    }
    let target = UnitId::new(actor.team, slot);

    let Some(patient) = field.get_mut(target) else {
        return false;
    };
    let applied = apply_healing(patient, amount);

    if let Some(unit) = field.get_mut(actor) {
        unit.stats.healing_done = unit.stats.healing_done.saturating_add(applied);
    }

    ctx.log.push(CombatAction {
        timestamp_ms: ctx.now,
        actor,
        kind,
        target: Some(target),
        ability_id: Some(ability_id.to_string()),
        amount: applied,
        critical: false,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AbilityKind, BaseStats, HeroRoster, Role, StatScaling};
    use crate::team::{Team, TeamSlot};
    use rand::SeedableRng;

    fn ability(
        id: &str,
        kind: AbilityKind,
        damage: Option<u32>,
        healing: Option<u32>,
    ) -> AbilityDefinition {
        AbilityDefinition {
            id: id.to_string(),
            name: String::new(),
            kind,
            cooldown_ms: 5000,
            energy_cost: 0,
            range: 0,
            damage,
            healing,
            area_radius: None,
            cast_time_ms: 1000,
        }
    }

    fn hero(id: &str, role: Role, abilities: Vec<AbilityDefinition>) -> HeroDefinition {
        HeroDefinition {
            id: id.to_string(),
            name: String::new(),
            role,
            stats: BaseStats {
                health: 1000,
                shield: 100,
                energy: 0,
                movement_speed: 0,
                attack_damage: 100,
                armor: 0,
                magic_resist: 0,
                attack_range: 1,
                attack_speed: 100,
            },
            scaling: StatScaling::default(),
            abilities,
        }
    }

    fn roster() -> HeroRoster {
        vec![
            hero("brute", Role::Tank, Vec::new()),
            hero(
                "caster",
                Role::Tank,
                vec![
                    ability("bolt", AbilityKind::Active, Some(50), None),
                    ability("nova", AbilityKind::Ultimate, Some(300), None),
                ],
            ),
            hero(
                "saint",
                Role::Support,
                vec![ability("grace", AbilityKind::Ultimate, None, Some(300))],
            ),
            hero(
                "medic",
                Role::Support,
                vec![
                    ability("patch", AbilityKind::Active, None, Some(200)),
                    ability("zap", AbilityKind::Active, Some(40), None),
                ],
            ),
        ]
        .into()
    }

    fn field(blue: &[&str], red: &[&str]) -> Battlefield {
        let slots = |ids: &[&str]| -> Vec<TeamSlot> {
            ids.iter()
                .enumerate()
                .map(|(i, id)| TeamSlot::new(*id, 0, i32::try_from(i).unwrap()))
                .collect()
        };
        Battlefield::from_slots(&slots(blue), &slots(red), &roster()).unwrap()
    }

    fn run_turn(
        field: &mut Battlefield,
        actor: UnitId,
        now: u64,
        log: &mut CombatLog,
    ) -> Option<ActionKind> {
        let config = EngineConfig {
            critical_chance_percent: 0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let roster = roster();
        let hero_id = field.get(actor).unwrap().hero_id.clone();
        let mut ctx = TurnContext {
            config: &config,
            now,
            rng: &mut rng,
            log,
        };
        resolve_turn(field, actor, roster.get(&hero_id), &mut ctx)
    }

    const BLUE0: UnitId = UnitId::new(Team::Blue, 0);
    const BLUE1: UnitId = UnitId::new(Team::Blue, 1);
    const RED0: UnitId = UnitId::new(Team::Red, 0);

    #[test]
    fn test_auto_attack_hits_and_schedules() {
        let mut f = field(&["brute"], &["brute"]);
        let mut log = CombatLog::new();

        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), Some(ActionKind::AutoAttack));
        let red = f.get(RED0).unwrap();
        assert_eq!(red.shield, Fixed::ZERO);
        assert_eq!(red.health, Fixed::from_num(1000));

        let blue = f.get(BLUE0).unwrap();
        assert_eq!(blue.next_auto_attack_at, 1000);
        // 0.5 upkeep + 2 from the attack
        assert_eq!(blue.ultimate_charge, Fixed::from_num(5) / Fixed::from_num(2));
        assert_eq!(blue.stats.damage_dealt, Fixed::from_num(100));

        // Not ready again until 1000 ms
        assert_eq!(run_turn(&mut f, BLUE0, 100, &mut log), None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_active_ability_before_auto_attack() {
        let mut f = field(&["caster"], &["brute"]);
        let mut log = CombatLog::new();

        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), Some(ActionKind::Ability));
        let caster = f.get(BLUE0).unwrap();
        assert_eq!(caster.cooldowns.get("bolt"), Some(&5000));
        // The ability ended the turn, so the auto-attack is still pending
        assert_eq!(caster.next_auto_attack_at, 0);

        assert_eq!(run_turn(&mut f, BLUE0, 100, &mut log), Some(ActionKind::AutoAttack));
    }

    #[test]
    fn test_ultimate_fires_at_full_charge() {
        let mut f = field(&["caster"], &["brute"]);
        let mut log = CombatLog::new();
        f.get_mut(BLUE0).unwrap().ultimate_charge = Fixed::from_num(99);

        // Upkeep pushes charge to 99.5, not enough
        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), Some(ActionKind::Ability));
        // 99.5 + 0.5 = 100
        assert_eq!(run_turn(&mut f, BLUE0, 100, &mut log), Some(ActionKind::Ultimate));

        let caster = f.get(BLUE0).unwrap();
        assert_eq!(caster.ultimate_charge, Fixed::ZERO);
        assert!(caster.is_casting());
        assert_eq!(caster.casting_until, Some(1100));

        // Cast lock blocks everything until it expires
        assert_eq!(run_turn(&mut f, BLUE0, 200, &mut log), None);
        assert_eq!(run_turn(&mut f, BLUE0, 1100, &mut log), Some(ActionKind::AutoAttack));
        assert!(!f.get(BLUE0).unwrap().is_casting());

        // The next swing is a full interval after the late one, not a catch-up
        assert_eq!(f.get(BLUE0).unwrap().next_auto_attack_at, 2100);
        assert_eq!(run_turn(&mut f, BLUE0, 1200, &mut log), None);
        assert_eq!(run_turn(&mut f, BLUE0, 2100, &mut log), Some(ActionKind::AutoAttack));
    }

    #[test]
    fn test_healing_ultimate_ignores_threshold() {
        let mut f = field(&["saint", "brute"], &["brute"]);
        let mut log = CombatLog::new();
        f.get_mut(BLUE0).unwrap().ultimate_charge = HUNDRED;
        f.get_mut(BLUE1).unwrap().health = Fixed::from_num(950);

        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), Some(ActionKind::Ultimate));
        assert_eq!(f.get(BLUE1).unwrap().health, Fixed::from_num(1000));

        let saint = f.get(BLUE0).unwrap();
        assert_eq!(saint.casting_until, Some(1000));
        assert_eq!(saint.stats.healing_done, Fixed::from_num(50));
        assert_eq!(saint.ultimate_charge, Fixed::ZERO);

        let grace = &log.entries()[0];
        assert_eq!(grace.kind, ActionKind::Ultimate);
        assert_eq!(grace.target, Some(BLUE1));
        assert_eq!(grace.amount, Fixed::from_num(50));
    }

    #[test]
    fn test_heal_waits_for_threshold() {
        let mut f = field(&["medic", "brute"], &["brute"]);
        let mut log = CombatLog::new();

        // Ally at 80%: heal skipped, damaging ability used instead
        f.get_mut(BLUE1).unwrap().health = Fixed::from_num(800);
        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), Some(ActionKind::Ability));

        // Ally at 50%: heal
        f.get_mut(BLUE1).unwrap().health = Fixed::from_num(500);
        assert_eq!(run_turn(&mut f, BLUE0, 100, &mut log), Some(ActionKind::Heal));
        assert_eq!(f.get(BLUE1).unwrap().health, Fixed::from_num(700));
        assert_eq!(f.get(BLUE0).unwrap().stats.healing_done, Fixed::from_num(200));

        let last = log.entries().last().unwrap();
        assert_eq!(last.target, Some(BLUE1));
        assert_eq!(last.ability_id.as_deref(), Some("patch"));
    }

    #[test]
    fn test_stun_blocks_abilities_and_attacks() {
        let mut f = field(&["caster"], &["brute"]);
        let mut log = CombatLog::new();
        f.get_mut(BLUE0).unwrap().status.stunned = true;
        assert_eq!(run_turn(&mut f, BLUE0, 0, &mut log), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_kill_logs_death_with_killer() {
        let mut f = field(&["brute"], &["brute"]);
        let mut log = CombatLog::new();
        {
            let red = f.get_mut(RED0).unwrap();
            red.shield = Fixed::ZERO;
            red.health = Fixed::from_num(30);
        }

        run_turn(&mut f, BLUE0, 0, &mut log);
        assert!(!f.get(RED0).unwrap().is_alive());
        assert_eq!(f.get(BLUE0).unwrap().stats.kills, 1);
        assert_eq!(f.get(BLUE0).unwrap().stats.damage_dealt, Fixed::from_num(30));

        let death = &log.entries()[1];
        assert_eq!(death.kind, ActionKind::Death);
        assert_eq!(death.actor, RED0);
        assert_eq!(death.target, Some(BLUE0));

        // Dead units take no turns
        assert_eq!(run_turn(&mut f, RED0, 100, &mut log), None);
    }

    #[test]
    fn test_shield_regenerates_after_quiet_window() {
        let mut f = field(&["brute"], &["brute"]);
        let mut log = CombatLog::new();
        {
            let blue = f.get_mut(BLUE0).unwrap();
            blue.shield = Fixed::from_num(50);
            blue.last_damaged_at = Some(1000);
            blue.next_auto_attack_at = u64::MAX;
        }

        run_turn(&mut f, BLUE0, 3900, &mut log);
        assert_eq!(f.get(BLUE0).unwrap().shield, Fixed::from_num(50));

        run_turn(&mut f, BLUE0, 4000, &mut log);
        assert_eq!(f.get(BLUE0).unwrap().shield, Fixed::from_num(52));
    }
}
