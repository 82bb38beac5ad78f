//! Error types for the battle engine.

use thiserror::Error;

use crate::team::Team;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle engine errors.
///
/// Every variant describes bad caller input. The simulation itself has no
/// retryable failure modes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// A team failed structural validation.
    #[error("Invalid {team} team: {}", .violations.join("; "))]
    InvalidTeam {
        /// Side whose composition was rejected.
        team: Team,
        /// Human-readable violations reported by the validator.
        violations: Vec<String>,
    },

    /// A team references a hero that the roster does not contain.
    #[error("Hero not found in roster: {0}")]
    HeroNotFound(String),

    /// Hero roster content is inconsistent.
    #[error("Invalid hero roster: {}", .0.join("; "))]
    InvalidRoster(Vec<String>),

    /// Engine configuration is out of range.
    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    /// Data text failed to parse.
    #[error("Failed to parse {source_name}: {message}")]
    DataParse {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Parser error message.
        message: String,
    },

    /// Binary encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Replay format version is not supported.
    #[error("Replay version mismatch: expected {expected}, found {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version stored in the record.
        found: u32,
    },

    /// Re-simulating a replay produced a different outcome.
    #[error("Replay mismatch: recorded digest {expected:#018x}, re-simulated {actual:#018x}")]
    ReplayMismatch {
        /// Digest stored in the record.
        expected: u64,
        /// Digest of the re-simulated battle.
        actual: u64,
    },
}
