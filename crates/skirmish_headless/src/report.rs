//! Human- and machine-readable battle summaries.
//!
//! Results store fixed-point numbers as raw bits; reports convert them to
//! decimals for JSON and text output.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use skirmish_core::log::ActionKind;
use skirmish_core::math::{Fixed, Readable};
use skirmish_core::result::{BattleResult, Winner};
use skirmish_core::unit::BattleUnit;

fn decimal(value: Fixed) -> f64 {
    value.to_num::<f64>()
}

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReport {
    /// Unit id, e.g. `blue#0`.
    pub unit: String,
    /// Roster hero id.
    pub hero_id: String,
    /// Survived the battle.
    pub alive: bool,
    /// Remaining health.
    pub health: f64,
    /// Remaining shield.
    pub shield: f64,
    /// Damage dealt.
    pub damage_dealt: f64,
    /// Damage taken.
    pub damage_taken: f64,
    /// Healing done.
    pub healing_done: f64,
    /// Kills scored.
    pub kills: u32,
}

impl UnitReport {
    fn from_unit(unit: &BattleUnit) -> Self {
        Self {
            unit: unit.id.to_string(),
            hero_id: unit.hero_id.clone(),
            alive: unit.is_alive(),
            health: decimal(unit.health),
            shield: decimal(unit.shield),
            damage_dealt: decimal(unit.stats.damage_dealt),
            damage_taken: decimal(unit.stats.damage_taken),
            healing_done: decimal(unit.stats.healing_done),
            kills: unit.stats.kills,
        }
    }
}

/// Summary of a finished battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Scenario name.
    pub scenario: String,
    /// Seed used.
    pub seed: u64,
    /// Winner.
    pub winner: Winner,
    /// Simulated duration.
    pub duration_ms: u64,
    /// Ticks processed.
    pub ticks: u64,
    /// Result digest as hex.
    pub digest: String,
    /// MVP unit id and hero.
    pub mvp: Option<String>,
    /// MVP score.
    pub mvp_score: Option<f64>,
    /// Combat log length.
    pub actions: usize,
    /// Critical hits landed.
    pub critical_hits: usize,
    /// Units eliminated.
    pub deaths: usize,
    /// Final unit states, blue then red.
    pub units: Vec<UnitReport>,
}

impl BattleReport {
    /// Summarize a result.
    pub fn from_result(scenario: &str, result: &BattleResult) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed: result.seed,
            winner: result.winner,
            duration_ms: result.duration_ms,
            ticks: result.ticks,
            digest: format!("{:016x}", result.digest),
            mvp: result
                .mvp
                .as_ref()
                .map(|m| format!("{} ({})", m.unit, m.hero_id)),
            mvp_score: result.mvp.as_ref().map(|m| decimal(m.score)),
            actions: result.log.len(),
            critical_hits: result.log.iter().filter(|a| a.critical).count(),
            deaths: result
                .log
                .iter()
                .filter(|a| a.kind == ActionKind::Death)
                .count(),
            units: result
                .blue
                .iter()
                .chain(result.red.iter())
                .map(UnitReport::from_unit)
                .collect(),
        }
    }
}

/// Render a result as a short text table.
pub fn render_text(scenario: &str, result: &BattleResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{scenario}: {} after {} ms ({} ticks), seed {}",
        result.winner, result.duration_ms, result.ticks, result.seed
    );
    for unit in result.blue.iter().chain(result.red.iter()) {
        let _ = writeln!(
            out,
            "  {:<8} {:<14} {:>4} hp {:>8} sh {:>7} dmg {:>8} heal {:>7} kills {}",
            unit.id.to_string(),
            unit.hero_id,
            if unit.is_alive() { "" } else { "dead" },
            Readable(unit.health).to_string(),
            Readable(unit.shield).to_string(),
            Readable(unit.stats.damage_dealt).to_string(),
            Readable(unit.stats.healing_done).to_string(),
            unit.stats.kills
        );
    }
    if let Some(mvp) = &result.mvp {
        let _ = writeln!(
            out,
            "  MVP: {} ({}) score {}",
            mvp.unit,
            mvp.hero_id,
            Readable(mvp.score)
        );
    }
    let _ = writeln!(out, "  digest {:016x}", result.digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::engine::BattleEngine;
    use skirmish_test_utils::fixtures::{standard_blue, standard_red, standard_roster};

    fn result() -> BattleResult {
        BattleEngine::default()
            .simulate_battle_seeded(&standard_blue(), &standard_red(), &standard_roster(), 3)
            .unwrap()
    }

    #[test]
    fn test_report_counts_match_log() {
        let result = result();
        let report = BattleReport::from_result("t", &result);

        assert_eq!(report.units.len(), 6);
        assert_eq!(report.actions, result.log.len());
        let dead = report.units.iter().filter(|u| !u.alive).count();
        assert_eq!(report.deaths, dead);
        assert_eq!(report.digest.len(), 16);
    }

    #[test]
    fn test_report_survives_json() {
        let report = BattleReport::from_result("t", &result());
        let json = serde_json::to_string(&report).unwrap();
        let back: BattleReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.winner, report.winner);
        assert_eq!(back.digest, report.digest);
        assert_eq!(back.units.len(), report.units.len());
        assert_eq!(back.units[0].hero_id, report.units[0].hero_id);
    }

    #[test]
    fn test_text_mentions_winner_and_units() {
        let result = result();
        let text = render_text("skirmish", &result);
        assert!(text.starts_with(&format!("skirmish: {}", result.winner)));
        assert!(text.contains("blue#0"));
        assert!(text.contains("red#2"));
    }
}
