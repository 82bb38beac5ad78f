//! Balance statistics over batches of battle results.
//!
//! Run many seeds of the same matchup and check that neither side wins
//! far more often than it should.

use std::collections::BTreeMap;

use skirmish_core::result::{BattleResult, Winner};

/// Statistics for a set of battles.
#[derive(Debug, Clone, Default)]
pub struct BattleStats {
    /// Total battles run.
    pub total_battles: u32,
    /// Wins for blue.
    pub wins_blue: u32,
    /// Wins for red.
    pub wins_red: u32,
    /// Draws (time cap with equal survivors or simultaneous elimination).
    pub draws: u32,
    /// Average battle duration in milliseconds.
    pub avg_duration_ms: f64,
    /// How often each hero was MVP.
    pub mvp_counts: BTreeMap<String, u32>,
}

impl BattleStats {
    /// Aggregate a batch of results.
    #[must_use]
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a BattleResult>) -> Self {
        let mut stats = Self::default();
        let mut total_duration: u64 = 0;

        for result in results {
            stats.record(result);
            total_duration += result.duration_ms;
        }

        if stats.total_battles > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                stats.avg_duration_ms = total_duration as f64 / f64::from(stats.total_battles);
            }
        }
        stats
    }

    fn record(&mut self, result: &BattleResult) {
        self.total_battles += 1;
        match result.winner {
            Winner::Blue => self.wins_blue += 1,
            Winner::Red => self.wins_red += 1,
            Winner::Draw => self.draws += 1,
        }
        if let Some(mvp) = &result.mvp {
            *self.mvp_counts.entry(mvp.hero_id.clone()).or_default() += 1;
        }
    }

    /// Calculate win rate for blue (0.0 to 1.0).
    #[must_use]
    pub fn win_rate_blue(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        f64::from(self.wins_blue) / f64::from(self.total_battles)
    }

    /// Calculate win rate for red (0.0 to 1.0).
    #[must_use]
    pub fn win_rate_red(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        f64::from(self.wins_red) / f64::from(self.total_battles)
    }

    /// Check if the matchup is balanced (blue's win rate within range).
    #[must_use]
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_blue();
        rate >= min_rate && rate <= max_rate
    }

    /// The hero that was MVP most often. Ties go to the smaller id.
    #[must_use]
    pub fn top_mvp(&self) -> Option<(&str, u32)> {
        self.mvp_counts
            .iter()
            .fold(None, |best: Option<(&str, u32)>, (id, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((id.as_str(), count)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{standard_blue, standard_red, standard_roster};
    use skirmish_core::simulation::Battle;
    use skirmish_core::config::EngineConfig;

    #[test]
    fn test_battle_stats_win_rate() {
        let stats = BattleStats {
            total_battles: 100,
            wins_blue: 55,
            wins_red: 40,
            draws: 5,
            avg_duration_ms: 30_000.0,
            mvp_counts: BTreeMap::new(),
        };

        assert!((stats.win_rate_blue() - 0.55).abs() < 0.001);
        assert!((stats.win_rate_red() - 0.40).abs() < 0.001);
        assert!(stats.is_balanced(0.45, 0.55));
    }

    #[test]
    fn test_empty_stats_are_even() {
        let stats = BattleStats::from_results(std::iter::empty());
        assert_eq!(stats.total_battles, 0);
        assert!((stats.win_rate_blue() - 0.5).abs() < f64::EPSILON);
        assert!(stats.top_mvp().is_none());
    }

    #[test]
    fn test_top_mvp_prefers_smaller_id_on_tie() {
        let mut stats = BattleStats::default();
        stats.mvp_counts.insert("medic".into(), 3);
        stats.mvp_counts.insert("deadeye".into(), 3);
        stats.mvp_counts.insert("vanguard".into(), 1);
        assert_eq!(stats.top_mvp(), Some(("deadeye", 3)));
    }

    #[test]
    fn test_from_results_counts_every_battle() {
        let roster = standard_roster();
        let (blue, red) = (standard_blue(), standard_red());
        let results: Vec<BattleResult> = (0..8u64)
            .map(|seed| {
                Battle::new(&blue, &red, &roster, EngineConfig::default(), seed)
                    .expect("valid battle")
                    .into_result()
            })
            .collect();

        let stats = BattleStats::from_results(&results);
        assert_eq!(stats.total_battles, 8);
        assert_eq!(stats.wins_blue + stats.wins_red + stats.draws, 8);
        assert_eq!(stats.mvp_counts.values().sum::<u32>(), 8);
        assert!(stats.avg_duration_ms > 0.0);
    }
}
