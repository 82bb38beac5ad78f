//! File IO for rosters, engine configs and replay records.
//!
//! The core crate only parses strings; everything that touches the disk
//! lives here.

use std::fs;
use std::path::{Path, PathBuf};

use skirmish_core::config::EngineConfig;
use skirmish_core::data::{HeroDefinition, HeroRoster};
use skirmish_core::replay::BattleRecord;

use crate::error::{HeadlessError, Result};

/// Default location of the shipped roster, relative to the workspace root.
pub const DEFAULT_ROSTER_PATH: &str = "assets/data/heroes.ron";

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Load and validate a hero roster from a RON file.
///
/// A roster that parses but fails content validation is logged and
/// rejected.
pub fn load_roster(path: &Path) -> Result<HeroRoster> {
    let text = read(path)?;
    let roster = HeroRoster::from_ron_str(&path.display().to_string(), &text)?;
    if let Err(e) = roster.validate() {
        tracing::warn!(path = %path.display(), error = %e, "Roster failed validation");
        return Err(e.into());
    }
    tracing::debug!(path = %path.display(), heroes = roster.len(), "Loaded roster");
    Ok(roster)
}

/// Load every `.ron` roster in a directory into one roster.
///
/// Files that fail to load are skipped with a warning. Later files win
/// when two files define the same hero id.
pub fn load_roster_dir(dir: &Path) -> Result<HeroRoster> {
    if !dir.is_dir() {
        return Err(HeadlessError::FileNotFound(dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    let mut merged = HeroRoster::new();
    for path in paths {
        match load_roster(&path) {
            Ok(roster) => {
                for hero in Vec::<HeroDefinition>::from(roster) {
                    merged.insert(hero);
                }
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping roster file"),
        }
    }
    Ok(merged)
}

/// Load a roster from a file or a directory of files.
pub fn load_roster_path(path: &Path) -> Result<HeroRoster> {
    if path.is_dir() {
        load_roster_dir(path)
    } else {
        load_roster(path)
    }
}

/// Load and validate an engine config from a RON file.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let text = read(path)?;
    Ok(EngineConfig::from_ron_str(&path.display().to_string(), &text)?)
}

/// Write a replay record.
pub fn save_record(record: &BattleRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, record.to_bytes()?)?;
    Ok(())
}

/// Read a replay record.
pub fn load_record(path: &Path) -> Result<BattleRecord> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    Ok(BattleRecord::from_bytes(&bytes)?)
}

/// Write any serializable value as pretty JSON.
pub fn save_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
