//! Scenario loading.
//!
//! A scenario names two drafted teams and the seed to fight them with,
//! optionally overriding engine tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::config::EngineConfig;
use skirmish_core::team::TeamSlot;

use crate::error::{HeadlessError, Result};

/// A complete battle setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Seed used when the caller does not supply one.
    #[serde(default)]
    pub seed: u64,
    /// Engine tuning override; missing fields keep their defaults.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Blue team.
    pub blue: Vec<TeamSlot>,
    /// Red team.
    pub red: Vec<TeamSlot>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HeadlessError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// A config override is validated here so a bad file fails at load time.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(ron)?;
        if let Some(config) = &scenario.config {
            config.validate()?;
        }
        Ok(scenario)
    }

    /// The engine config to run with: the override, else `fallback`.
    #[must_use]
    pub fn config_or(&self, fallback: &EngineConfig) -> EngineConfig {
        self.config.clone().unwrap_or_else(|| fallback.clone())
    }
}
