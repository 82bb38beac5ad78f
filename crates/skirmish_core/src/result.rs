//! Battle outcome compilation.
//!
//! Once a battle terminates its state is folded into a [`BattleResult`]:
//! winner, full combat log, final snapshots of both teams and the MVP.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{BattleError, Result};
use crate::log::{CombatAction, CombatLog};
use crate::math::{fixed_serde, Fixed};
use crate::team::Team;
use crate::unit::{BattleUnit, Battlefield, UnitId};

/// Outcome of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// Blue side won.
    Blue,
    /// Red side won.
    Red,
    /// Neither side won.
    Draw,
}

impl Winner {
    /// The winning side, if not a draw.
    #[must_use]
    pub const fn team(self) -> Option<Team> {
        match self {
            Winner::Blue => Some(Team::Blue),
            Winner::Red => Some(Team::Red),
            Winner::Draw => None,
        }
    }
}

impl From<Team> for Winner {
    fn from(team: Team) -> Self {
        match team {
            Team::Blue => Winner::Blue,
            Team::Red => Winner::Red,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Blue => f.write_str("blue"),
            Winner::Red => f.write_str("red"),
            Winner::Draw => f.write_str("draw"),
        }
    }
}

/// Most valuable unit of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MvpRecord {
    /// The unit.
    pub unit: UnitId,
    /// Its hero.
    pub hero_id: String,
    /// Damage dealt over the battle.
    #[serde(with = "fixed_serde")]
    pub damage_dealt: Fixed,
    /// Healing done over the battle.
    #[serde(with = "fixed_serde")]
    pub healing_done: Fixed,
    /// `damage_dealt + healing_done / 2`.
    #[serde(with = "fixed_serde")]
    pub score: Fixed,
}

/// Final, immutable record of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// Who won.
    pub winner: Winner,
    /// Simulated time when the battle ended.
    pub duration_ms: u64,
    /// Ticks that ran.
    pub ticks: u64,
    /// Seed of the battle's random stream.
    pub seed: u64,
    /// Every combat event, in order.
    pub log: Vec<CombatAction>,
    /// Final blue snapshot.
    pub blue: Vec<BattleUnit>,
    /// Final red snapshot.
    pub red: Vec<BattleUnit>,
    /// Best performer, absent only when both teams are empty.
    pub mvp: Option<MvpRecord>,
    /// Leading 8 bytes of the SHA-256 of every field above, bincode encoded.
    pub digest: u64,
}

/// Contribution score used for MVP selection.
#[must_use]
pub fn mvp_score(unit: &BattleUnit) -> Fixed {
    unit.stats
        .damage_dealt
        .saturating_add(unit.stats.healing_done / Fixed::from_num(2))
}

/// Pick the highest scoring unit. Ties go to the earliest unit.
pub fn select_mvp<'a>(units: impl IntoIterator<Item = &'a BattleUnit>) -> Option<MvpRecord> {
    let mut best: Option<(&BattleUnit, Fixed)> = None;
    for unit in units {
        let score = mvp_score(unit);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((unit, score));
        }
    }
    best.map(|(unit, score)| MvpRecord {
        unit: unit.id,
        hero_id: unit.hero_id.clone(),
        damage_dealt: unit.stats.damage_dealt,
        healing_done: unit.stats.healing_done,
        score,
    })
}

/// Fold a terminated battle into its result.
#[must_use]
pub fn compile_result(
    winner: Winner,
    duration_ms: u64,
    ticks: u64,
    seed: u64,
    log: CombatLog,
    field: Battlefield,
) -> BattleResult {
    let mvp = select_mvp(field.iter());
    let mut result = BattleResult {
        winner,
        duration_ms,
        ticks,
        seed,
        log: log.into_entries(),
        blue: field.blue,
        red: field.red,
        mvp,
        digest: 0,
    };
    result.digest = result.compute_digest();
    result
}

impl BattleResult {
    /// Hash every field except `digest` itself.
    ///
    /// SHA-256 over the bincode encoding, so the value is stable across
    /// toolchains and platforms.
    #[must_use]
    pub fn compute_digest(&self) -> u64 {
        let mut hasher = Sha256::new();
        let fields = (
            self.winner,
            self.duration_ms,
            self.ticks,
            self.seed,
            &self.log,
            &self.blue,
            &self.red,
            &self.mvp,
        );
        if let Ok(bytes) = bincode::serialize(&fields) {
            hasher.update(&bytes);
        }
        let hash: [u8; 32] = hasher.finalize().into();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash[..8]);
        u64::from_be_bytes(head)
    }

    /// Check that `digest` matches the rest of the record.
    #[must_use]
    pub fn is_intact(&self) -> bool {
        self.digest == self.compute_digest()
    }

    /// Final snapshot of one side.
    #[must_use]
    pub fn team(&self, team: Team) -> &[BattleUnit] {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// Units of `team` still alive at the end.
    #[must_use]
    pub fn survivors(&self, team: Team) -> usize {
        self.team(team).iter().filter(|u| u.is_alive()).count()
    }

    /// Encode with bincode.
    ///
    /// # Errors
    /// Returns [`BattleError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| BattleError::Serialization(e.to_string()))
    }

    /// Decode from bincode.
    ///
    /// # Errors
    /// Returns [`BattleError::Serialization`] if decoding fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| BattleError::Serialization(e.to_string()))
    }
}
