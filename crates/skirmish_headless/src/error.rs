//! Error type for the headless runner.

use skirmish_core::error::BattleError;
use thiserror::Error;

/// Errors raised while loading files or running battles from the CLI.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// Failed to encode or decode JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The engine rejected the input or a replay failed.
    #[error(transparent)]
    Battle(#[from] BattleError),
    /// A scenario's teams do not fit the roster or the team rules.
    #[error("Scenario '{name}' has {problems} problem(s)")]
    InvalidScenario {
        /// Scenario name.
        name: String,
        /// Number of problems found.
        problems: usize,
    },
    /// The worker pool could not be built.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Result alias for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;
