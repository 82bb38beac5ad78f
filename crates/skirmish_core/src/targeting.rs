//! Target selection.
//!
//! Both selectors scan in slot order and replace the current pick only on a
//! strictly better score, so ties always resolve to the lowest slot.

use crate::math::Fixed;
use crate::unit::BattleUnit;

/// Pick the enemy `actor` should attack, as an index into `enemies`.
///
/// Melee units (range at or below `ranged_threshold`) must hit the front
/// line while any front-line enemy lives. Among candidates the one with the
/// lowest effective health ratio wins.
#[must_use]
pub fn select_attack_target(
    actor: &BattleUnit,
    enemies: &[BattleUnit],
    ranged_threshold: u32,
) -> Option<usize> {
    let front_line_only = !actor.is_ranged(ranged_threshold)
        && enemies
            .iter()
            .any(|e| e.is_alive() && e.position.is_front_line());

    lowest_by(enemies, BattleUnit::effective_health_ratio, |e| {
        e.is_alive() && (!front_line_only || e.position.is_front_line())
    })
}

/// Pick the ally most in need of healing, as an index into `allies`.
///
/// The acting unit is part of `allies` and may pick itself. Returns `None`
/// when every living ally is at full health.
#[must_use]
pub fn select_heal_target(allies: &[BattleUnit]) -> Option<usize> {
    lowest_by(allies, BattleUnit::health_ratio, |a| {
        a.is_alive() && a.is_injured()
    })
}

fn lowest_by(
    units: &[BattleUnit],
    score: impl Fn(&BattleUnit) -> Fixed,
    eligible: impl Fn(&BattleUnit) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, Fixed)> = None;
    for (index, unit) in units.iter().enumerate() {
        if !eligible(unit) {
            continue;
        }
        let value = score(unit);
        if best.map_or(true, |(_, current)| value < current) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}
