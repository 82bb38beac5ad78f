//! Replay records for third-party verification.
//!
//! A battle is a pure function of its teams, roster, config and seed, so a
//! record only needs to store those inputs plus the digest of the outcome.
//! Anyone holding the same roster can re-simulate and compare digests.
//!
//! Records are encoded with bincode. This module does no file IO; callers
//! write and read the bytes.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::data::HeroRoster;
use crate::error::{BattleError, Result};
use crate::result::{BattleResult, Winner};
use crate::simulation::Battle;
use crate::team::TeamSlot;

/// Record format version for compatibility.
pub const RECORD_VERSION: u32 = 1;

/// Inputs and outcome of one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    /// Record format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Blue team as submitted.
    pub blue: Vec<TeamSlot>,
    /// Red team as submitted.
    pub red: Vec<TeamSlot>,
    /// Engine configuration used.
    pub config: EngineConfig,
    /// Seed of the battle's random stream.
    pub seed: u64,
    /// Recorded winner.
    pub winner: Winner,
    /// Recorded ticks.
    pub ticks: u64,
    /// Digest of the recorded [`BattleResult`].
    pub digest: u64,
}

impl BattleRecord {
    /// Build a record from a battle's inputs and result.
    #[must_use]
    pub fn new(
        scenario_id: impl Into<String>,
        blue: &[TeamSlot],
        red: &[TeamSlot],
        config: &EngineConfig,
        result: &BattleResult,
    ) -> Self {
        Self {
            version: RECORD_VERSION,
            scenario_id: scenario_id.into(),
            blue: blue.to_vec(),
            red: red.to_vec(),
            config: config.clone(),
            seed: result.seed,
            winner: result.winner,
            ticks: result.ticks,
            digest: result.digest,
        }
    }

    /// Encode the record.
    ///
    /// # Errors
    /// Returns [`BattleError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::Serialization(format!("Failed to serialize record: {e}")))
    }

    /// Decode a record, rejecting unknown format versions.
    ///
    /// # Errors
    /// Returns [`BattleError::Serialization`] for malformed bytes and
    /// [`BattleError::ReplayVersion`] for a version mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: Self = bincode::deserialize(bytes).map_err(|e| {
            BattleError::Serialization(format!("Failed to deserialize record: {e}"))
        })?;

        if record.version != RECORD_VERSION {
            return Err(BattleError::ReplayVersion {
                expected: RECORD_VERSION,
                found: record.version,
            });
        }

        Ok(record)
    }

    /// Re-run the battle from the recorded inputs.
    ///
    /// # Errors
    /// Propagates team, hero and config errors from [`Battle::new`].
    pub fn resimulate(&self, roster: &HeroRoster) -> Result<BattleResult> {
        let battle = Battle::new(&self.blue, &self.red, roster, self.config.clone(), self.seed)?;
        Ok(battle.into_result())
    }

    /// Re-run the battle and check that it reproduces the recorded digest.
    ///
    /// # Errors
    /// Returns [`BattleError::ReplayMismatch`] if the outcome differs, or any
    /// error from [`BattleRecord::resimulate`].
    pub fn verify(&self, roster: &HeroRoster) -> Result<BattleResult> {
        let result = self.resimulate(roster)?;
        if result.digest != self.digest {
            tracing::warn!(
                scenario = %self.scenario_id,
                seed = self.seed,
                "Replay verification failed"
            );
            return Err(BattleError::ReplayMismatch {
                expected: self.digest,
                actual: result.digest,
            });
        }
        Ok(result)
    }
}
