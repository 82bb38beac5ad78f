//! Batch battle runner for balance testing.
//!
//! Runs one scenario over a range of seeds in parallel using rayon and
//! aggregates win rates, durations and MVP frequency.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::data::HeroRoster;
use skirmish_core::engine::BattleEngine;
use skirmish_core::result::{BattleResult, Winner};
use skirmish_core::simulation::BattlePhase;
use tracing::{debug, info};

use crate::error::{HeadlessError, Result};
use crate::scenario::Scenario;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name, for reporting.
    pub scenario: String,
    /// Number of battles to run.
    pub game_count: u32,
    /// Seed of the first battle; battle `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Worker threads (0 = rayon default).
    pub parallel: usize,
}

impl BatchConfig {
    /// Create config for a scenario.
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            seed_start: 0,
            parallel: 0,
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count.
    pub fn with_parallel(mut self, threads: usize) -> Self {
        self.parallel = threads;
        self
    }
}

/// Summary of one finished battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Battle index within the batch.
    pub index: u32,
    /// Seed used.
    pub seed: u64,
    /// Winner.
    pub winner: Winner,
    /// Simulated duration.
    pub duration_ms: u64,
    /// Ticks processed.
    pub ticks: u64,
    /// Hero id of the MVP.
    pub mvp_hero: Option<String>,
    /// Result digest.
    pub digest: u64,
}

impl GameOutcome {
    fn from_result(index: u32, result: &BattleResult) -> Self {
        Self {
            index,
            seed: result.seed,
            winner: result.winner,
            duration_ms: result.duration_ms,
            ticks: result.ticks,
            mvp_hero: result.mvp.as_ref().map(|m| m.hero_id.clone()),
            digest: result.digest,
        }
    }
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Battles that finished.
    pub total: u32,
    /// Blue wins.
    pub blue_wins: u32,
    /// Red wins.
    pub red_wins: u32,
    /// Draws.
    pub draws: u32,
    /// Blue win rate (0.0 to 1.0).
    pub blue_win_rate: f64,
    /// Red win rate (0.0 to 1.0).
    pub red_win_rate: f64,
    /// Mean simulated duration.
    pub avg_duration_ms: f64,
    /// MVP count per hero id.
    pub mvp_counts: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Aggregate finished games.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_games(games: &[GameOutcome]) -> Self {
        let mut summary = Self::default();
        let mut total_duration = 0u64;

        for game in games {
            summary.total += 1;
            total_duration += game.duration_ms;
            match game.winner {
                Winner::Blue => summary.blue_wins += 1,
                Winner::Red => summary.red_wins += 1,
                Winner::Draw => summary.draws += 1,
            }
            if let Some(hero) = &game.mvp_hero {
                *summary.mvp_counts.entry(hero.clone()).or_default() += 1;
            }
        }

        if summary.total > 0 {
            let total = f64::from(summary.total);
            summary.blue_win_rate = f64::from(summary.blue_wins) / total;
            summary.red_win_rate = f64::from(summary.red_wins) / total;
            summary.avg_duration_ms = total_duration as f64 / total;
        }
        summary
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Finished battles in index order.
    pub games: Vec<GameOutcome>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Battles abandoned by cancellation.
    pub cancelled: u32,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::loader::save_json(self, path)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Shared progress and cancellation for a running batch.
#[derive(Debug, Default)]
pub struct BatchProgress {
    completed: AtomicU32,
    cancelled: AtomicBool,
}

impl BatchProgress {
    /// Create a fresh tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask running battles to stop at their next tick.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Battles finished so far.
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Run one battle, stepping until it ends or the batch is cancelled.
fn run_single(
    engine: &BattleEngine,
    scenario: &Scenario,
    roster: &HeroRoster,
    seed: u64,
    progress: &BatchProgress,
) -> Result<Option<BattleResult>> {
    let mut battle = engine.start_battle(&scenario.blue, &scenario.red, roster, seed)?;
    loop {
        if progress.is_cancelled() {
            return Ok(None);
        }
        if let BattlePhase::Terminated(_) = battle.step() {
            return Ok(Some(battle.into_result()));
        }
    }
}

/// Run `config.game_count` battles of `scenario` in parallel.
///
/// Input errors are reported before any worker starts. Battles abandoned
/// through `progress` are counted in [`BatchResults::cancelled`].
pub fn run_batch(
    engine: &BattleEngine,
    scenario: &Scenario,
    roster: &HeroRoster,
    config: &BatchConfig,
    progress: &BatchProgress,
) -> Result<BatchResults> {
    let start = Instant::now();

    // Fail fast on bad teams or unknown heroes.
    drop(engine.start_battle(&scenario.blue, &scenario.red, roster, config.seed_start)?);

    info!(
        scenario = %config.scenario,
        count = config.game_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let run = || -> Result<Vec<Option<GameOutcome>>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                let outcome = run_single(engine, scenario, roster, seed, progress)?
                    .map(|result| GameOutcome::from_result(i, &result));
                if outcome.is_some() {
                    let done = progress.record_completion();
                    if done % 100 == 0 {
                        debug!("Progress: {}/{}", done, config.game_count);
                    }
                }
                Ok(outcome)
            })
            .collect()
    };

    let outcomes = if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
            .map_err(|e| HeadlessError::ThreadPool(e.to_string()))?
            .install(run)?
    } else {
        run()?
    };

    let total = outcomes.len();
    let games: Vec<GameOutcome> = outcomes.into_iter().flatten().collect();
    let cancelled = u32::try_from(total - games.len()).unwrap_or(u32::MAX);
    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        games = games.len(),
        cancelled,
        blue_win_rate = summary.blue_win_rate,
        "Batch complete in {:.1}s",
        duration_seconds
    );

    Ok(BatchResults {
        config: config.clone(),
        games,
        summary,
        cancelled,
        duration_seconds,
    })
}
