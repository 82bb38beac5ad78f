//! Determinism testing utilities.
//!
//! Provides a harness for verifying that battles produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Battle results must be reproducible bit for bit so third parties can
//! verify them. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`skirmish_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Units act in team then slot order and cooldowns live in a `BTreeMap`.
//!
//! - **System randomness**: Critical hits draw from a seeded `ChaCha8Rng`.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual resolvers (targeting, damage, actions)
//! 2. **Property tests**: Random valid teams must still replay identically
//! 3. **Integration tests**: Full scenarios are reproducible
//! 4. **Parallel tests**: Running N battles on N threads all match

use std::thread;

use skirmish_core::config::EngineConfig;
use skirmish_core::data::HeroRoster;
use skirmish_core::result::BattleResult;
use skirmish_core::simulation::Battle;
use skirmish_core::team::TeamSlot;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Step the same battle `runs` times for `ticks` ticks each and compare
/// the final state hashes.
///
/// Stops early once a run terminates, so `ticks` may exceed the battle's
/// length.
///
/// # Panics
///
/// Panics if the setup is invalid.
#[must_use]
pub fn verify_determinism(setup: &BattleSetup<'_>, runs: usize, ticks: u64) -> DeterminismResult {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut battle = setup.start();
            for _ in 0..ticks {
                if battle.step().is_terminated() {
                    break;
                }
            }
            battle.state_hash()
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Inputs of one battle, bundled for repeated runs.
#[derive(Debug, Clone)]
pub struct BattleSetup<'a> {
    /// Blue team.
    pub blue: &'a [TeamSlot],
    /// Red team.
    pub red: &'a [TeamSlot],
    /// Hero roster.
    pub roster: &'a HeroRoster,
    /// Engine configuration.
    pub config: EngineConfig,
    /// Battle seed.
    pub seed: u64,
}

impl<'a> BattleSetup<'a> {
    /// Bundle inputs with the default config.
    #[must_use]
    pub fn new(blue: &'a [TeamSlot], red: &'a [TeamSlot], roster: &'a HeroRoster, seed: u64) -> Self {
        Self {
            blue,
            red,
            roster,
            config: EngineConfig::default(),
            seed,
        }
    }

    /// Start a fresh battle.
    ///
    /// # Panics
    ///
    /// Panics if the inputs are invalid.
    #[must_use]
    pub fn start(&self) -> Battle<'a> {
        Battle::new(self.blue, self.red, self.roster, self.config.clone(), self.seed)
            .expect("battle setup must be valid")
    }

    /// Run a fresh battle to completion.
    #[must_use]
    pub fn run(&self) -> BattleResult {
        self.start().into_result()
    }
}

/// Run the same battle `runs` times and compare the bincode encoding of
/// every result.
///
/// # Panics
///
/// Panics if the inputs are invalid or a result fails to encode.
#[must_use]
pub fn verify_battle_determinism(setup: &BattleSetup<'_>, runs: usize) -> bool {
    let encodings: Vec<Vec<u8>> = (0..runs)
        .map(|_| setup.run().to_bytes().expect("result must encode"))
        .collect();
    encodings.windows(2).all(|w| w[0] == w[1])
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Result digest from each battle.
    pub digests: Vec<u64>,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.digests.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different digests.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.digests.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Unique digests: {}\n\
                 All digests: {:?}",
                self.num_battles,
                unique.len(),
                self.digests
            );
        }
    }
}

/// Run the same battle on `num_battles` scoped threads at once.
///
/// # Panics
///
/// Panics if a worker thread panics.
#[must_use]
pub fn run_parallel_battles_scoped(setup: &BattleSetup<'_>, num_battles: usize) -> ParallelBattleResult {
    let digests = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| s.spawn(|| setup.run().digest))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });

    ParallelBattleResult {
        digests,
        num_battles,
    }
}

/// Find the first tick where two battles from the same setup differ.
///
/// Returns `None` if the battles stay identical for `max_ticks` ticks.
pub fn find_first_divergence<'r, F>(setup_fn: F, max_ticks: u64) -> Option<u64>
where
    F: Fn() -> Battle<'r>,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=max_ticks {
        a.step();
        b.step();

        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
        if a.phase().is_terminated() && b.phase().is_terminated() {
            break;
        }
    }

    None
}

/// Proptest strategies for battle inputs.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::team::{GridPosition, TeamSlot, GRID_SIZE, MAX_TEAM_SIZE, MIN_TEAM_SIZE};

    /// Generate a battle seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a hero level (1-10).
    pub fn arb_level() -> impl Strategy<Value = u32> {
        1u32..=10
    }

    /// Generate a valid grid position.
    pub fn arb_position() -> impl Strategy<Value = GridPosition> {
        (0..GRID_SIZE, 0..GRID_SIZE).prop_map(|(row, col)| GridPosition::new(row, col))
    }

    /// Generate a structurally valid team drawn from `hero_ids`.
    ///
    /// Heroes and cells are distinct within the team and the slot order is
    /// shuffled. `hero_ids` must contain at least three ids.
    pub fn arb_team(hero_ids: Vec<String>) -> impl Strategy<Value = Vec<TeamSlot>> {
        let max = hero_ids.len().min(MAX_TEAM_SIZE);
        (MIN_TEAM_SIZE..=max)
            .prop_flat_map(move |size| {
                let cells: Vec<i32> = (0..GRID_SIZE * GRID_SIZE).collect();
                (
                    proptest::sample::subsequence(hero_ids.clone(), size).prop_shuffle(),
                    proptest::sample::subsequence(cells, size).prop_shuffle(),
                    proptest::collection::vec(arb_level(), size),
                )
            })
            .prop_map(|(heroes, cells, levels)| {
                heroes
                    .into_iter()
                    .zip(cells)
                    .zip(levels)
                    .map(|((hero_id, cell), level)| TeamSlot {
                        hero_id,
                        position: GridPosition::new(cell / GRID_SIZE, cell % GRID_SIZE),
                        level,
                    })
                    .collect()
            })
    }

    /// Generate a slot that may be malformed: any coordinates in `-2..6`
    /// and any level in `0..40`.
    pub fn arb_loose_slot(hero_ids: Vec<String>) -> impl Strategy<Value = TeamSlot> {
        (
            proptest::sample::select(hero_ids),
            -2i32..6,
            -2i32..6,
            0u32..40,
        )
            .prop_map(|(hero_id, row, col, level)| TeamSlot {
                hero_id,
                position: GridPosition::new(row, col),
                level,
            })
    }
}
