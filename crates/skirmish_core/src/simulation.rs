//! Core battle loop.
//!
//! A [`Battle`] advances simulated time in fixed ticks. Each tick it first
//! checks whether the battle is over, then gives every living unit one turn
//! (blue by slot, then red by slot) and finally advances the clock.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`crate::math::Fixed`])
//! - No system randomness (critical rolls use a seeded `ChaCha8Rng`)
//! - No wall-clock time (the clock is simulated)
//! - Consistent iteration order (team, then slot)
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::EngineConfig;
//! use skirmish_core::data::{BaseStats, HeroDefinition, HeroRoster, Role, StatScaling};
//! use skirmish_core::simulation::Battle;
//! use skirmish_core::team::TeamSlot;
//!
//! let hero = |id: &str| HeroDefinition {
//!     id: id.to_string(),
//!     name: String::new(),
//!     role: Role::Assault,
//!     stats: BaseStats {
//!         health: 300,
//!         shield: 0,
//!         energy: 0,
//!         movement_speed: 0,
//!         attack_damage: 40,
//!         armor: 0,
//!         magic_resist: 0,
//!         attack_range: 1,
//!         attack_speed: 100,
//!     },
//!     scaling: StatScaling::default(),
//!     abilities: Vec::new(),
//! };
//! let roster: HeroRoster = vec![hero("a"), hero("b"), hero("c")].into();
//! let team = vec![
//!     TeamSlot::new("a", 0, 0),
//!     TeamSlot::new("b", 0, 1),
//!     TeamSlot::new("c", 1, 0),
//! ];
//!
//! let mut battle = Battle::new(&team, &team, &roster, EngineConfig::default(), 42).unwrap();
//! let winner = battle.run();
//! let result = battle.into_result();
//! assert_eq!(result.winner, winner);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::actions::{resolve_turn, TurnContext};
use crate::config::EngineConfig;
use crate::data::HeroRoster;
use crate::error::{BattleError, Result};
use crate::log::CombatLog;
use crate::result::{compile_result, BattleResult, Winner};
use crate::team::{validate_team, Team, TeamSlot};
use crate::unit::Battlefield;

/// Lifecycle of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    /// Ticks are still being processed.
    Running,
    /// The battle is over.
    Terminated(Winner),
}

impl BattlePhase {
    /// Check if the battle is over.
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, BattlePhase::Terminated(_))
    }
}

/// Decide whether a battle is over.
///
/// Elimination is checked first. At or past `max_duration_ms` the side with
/// more living units wins and equal counts draw.
#[must_use]
pub fn check_termination(
    blue_alive: usize,
    red_alive: usize,
    now: u64,
    max_duration_ms: u64,
) -> Option<Winner> {
    match (blue_alive, red_alive) {
        (0, 0) => Some(Winner::Draw),
        (0, _) => Some(Winner::Red),
        (_, 0) => Some(Winner::Blue),
        _ if now >= max_duration_ms => Some(match blue_alive.cmp(&red_alive) {
            std::cmp::Ordering::Greater => Winner::Blue,
            std::cmp::Ordering::Less => Winner::Red,
            std::cmp::Ordering::Equal => Winner::Draw,
        }),
        _ => None,
    }
}

/// A single battle in progress.
///
/// Borrows the roster for its whole lifetime. Dropping a `Battle` at any
/// point abandons it with no side effects.
#[derive(Debug)]
pub struct Battle<'r> {
    roster: &'r HeroRoster,
    config: EngineConfig,
    field: Battlefield,
    log: CombatLog,
    rng: ChaCha8Rng,
    seed: u64,
    now: u64,
    ticks: u64,
    phase: BattlePhase,
}

impl<'r> Battle<'r> {
    /// Set up a battle between two teams.
    ///
    /// # Errors
    /// - [`BattleError::InvalidConfig`] if `config` is unusable
    /// - [`BattleError::InvalidTeam`] if either team fails validation
    ///   (blue is reported first)
    /// - [`BattleError::HeroNotFound`] if a slot names an unknown hero
    pub fn new(
        blue: &[TeamSlot],
        red: &[TeamSlot],
        roster: &'r HeroRoster,
        config: EngineConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        for (team, slots) in [(Team::Blue, blue), (Team::Red, red)] {
            let validation = validate_team(slots);
            if !validation.valid {
                return Err(BattleError::InvalidTeam {
                    team,
                    violations: validation.errors,
                });
            }
        }

        let field = Battlefield::from_slots(blue, red, roster)?;
        debug!(
            seed,
            blue = blue.len(),
            red = red.len(),
            "Battle initialized"
        );

        Ok(Self {
            roster,
            config,
            field,
            log: CombatLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            now: 0,
            ticks: 0,
            phase: BattlePhase::Running,
        })
    }

    /// Advance the battle by one tick.
    ///
    /// Checks termination first; if the battle is over nothing else happens.
    /// Otherwise every living unit takes a turn and the clock advances.
    pub fn step(&mut self) -> BattlePhase {
        if self.phase.is_terminated() {
            return self.phase;
        }

        if let Some(winner) = check_termination(
            self.field.living(Team::Blue),
            self.field.living(Team::Red),
            self.now,
            self.config.max_duration_ms,
        ) {
            debug!(%winner, ticks = self.ticks, at = self.now, "Battle terminated");
            self.phase = BattlePhase::Terminated(winner);
            return self.phase;
        }

        let roster = self.roster;
        let mut ctx = TurnContext {
            config: &self.config,
            now: self.now,
            rng: &mut self.rng,
            log: &mut self.log,
        };
        for actor in self.field.turn_order() {
            let hero = self
                .field
                .get(actor)
                .and_then(|unit| roster.get(&unit.hero_id));
            resolve_turn(&mut self.field, actor, hero, &mut ctx);
        }

        self.now += self.config.tick_ms;
        self.ticks += 1;
        self.phase
    }

    /// Step until the battle terminates.
    pub fn run(&mut self) -> Winner {
        loop {
            if let BattlePhase::Terminated(winner) = self.step() {
                return winner;
            }
        }
    }

    /// Finish the battle if needed and compile its result.
    #[must_use]
    pub fn into_result(mut self) -> BattleResult {
        let winner = self.run();
        compile_result(winner, self.now, self.ticks, self.seed, self.log, self.field)
    }

    /// Hash of the full mutable state, for divergence hunting.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.now.hash(&mut hasher);
        self.ticks.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.field.hash(&mut hasher);
        self.log.len().hash(&mut hasher);
        self.rng.get_word_pos().hash(&mut hasher);
        hasher.finish()
    }

    /// Current simulated time.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Seed of the random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Engine configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Both teams' live state.
    #[must_use]
    pub const fn field(&self) -> &Battlefield {
        &self.field
    }

    /// Mutable access to both teams, for scripted scenarios and tests.
    pub fn field_mut(&mut self) -> &mut Battlefield {
        &mut self.field
    }

    /// Combat log so far.
    #[must_use]
    pub const fn log(&self) -> &CombatLog {
        &self.log
    }
}
