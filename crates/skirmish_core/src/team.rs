//! Team composition and structural validation.
//!
//! A team is an ordered list of [`TeamSlot`]s. Slot order is significant:
//! it is the order in which units act within a tick.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fewest units a team may field.
pub const MIN_TEAM_SIZE: usize = 3;

/// Most units a team may field.
pub const MAX_TEAM_SIZE: usize = 5;

/// Width and height of each side's placement grid.
pub const GRID_SIZE: i32 = 4;

/// Highest hero level a slot may request.
pub const MAX_HERO_LEVEL: u32 = 30;

/// One side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Acts first within every tick.
    Blue,
    /// Acts after blue within every tick.
    Red,
}

impl Team {
    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Blue => f.write_str("blue"),
            Team::Red => f.write_str("red"),
        }
    }
}

/// Cell on a team's placement grid. Row 0 is the front line.
///
/// Coordinates are signed so malformed input stays representable until the
/// validator rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    /// Distance from the front line.
    pub row: i32,
    /// Lateral column.
    pub col: i32,
}

impl GridPosition {
    /// Create a grid position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Check if the position is on the front line.
    #[must_use]
    pub const fn is_front_line(self) -> bool {
        self.row == 0
    }

    /// Check if the position lies inside the placement grid.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.row >= 0 && self.row < GRID_SIZE && self.col >= 0 && self.col < GRID_SIZE
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A drafted hero placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSlot {
    /// Roster id of the hero.
    pub hero_id: String,
    /// Placement on the owning team's grid.
    pub position: GridPosition,
    /// Hero level, scaling base stats.
    #[serde(default = "default_level")]
    pub level: u32,
}

const fn default_level() -> u32 {
    1
}

impl TeamSlot {
    /// Create a level 1 slot.
    #[must_use]
    pub fn new(hero_id: impl Into<String>, row: i32, col: i32) -> Self {
        Self {
            hero_id: hero_id.into(),
            position: GridPosition::new(row, col),
            level: 1,
        }
    }

    /// Set the hero level.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// Outcome of [`validate_team`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamValidation {
    /// True when no rule was violated.
    pub valid: bool,
    /// Every violation found, in rule order.
    pub errors: Vec<String>,
}

impl TeamValidation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check a team's structure.
///
/// Collects every violation rather than stopping at the first. Does not
/// consult the roster: unknown hero ids surface later as
/// [`crate::error::BattleError::HeroNotFound`].
#[must_use]
pub fn validate_team(slots: &[TeamSlot]) -> TeamValidation {
    let mut errors = Vec::new();

    if slots.len() < MIN_TEAM_SIZE || slots.len() > MAX_TEAM_SIZE {
        errors.push(format!(
            "team must have between {MIN_TEAM_SIZE} and {MAX_TEAM_SIZE} units, got {}",
            slots.len()
        ));
    }

    let mut heroes = BTreeSet::new();
    let mut positions = BTreeSet::new();

    for slot in slots {
        if !heroes.insert(slot.hero_id.as_str()) {
            errors.push(format!("duplicate hero '{}'", slot.hero_id));
        }
        if !positions.insert(slot.position) {
            errors.push(format!("duplicate position {}", slot.position));
        }
        if !slot.position.in_bounds() {
            errors.push(format!(
                "position {} of '{}' is outside the {GRID_SIZE}x{GRID_SIZE} grid",
                slot.position, slot.hero_id
            ));
        }
        if slot.level == 0 || slot.level > MAX_HERO_LEVEL {
            errors.push(format!(
                "level {} of '{}' is outside 1..={MAX_HERO_LEVEL}",
                slot.level, slot.hero_id
            ));
        }
    }

    TeamValidation::from_errors(errors)
}
