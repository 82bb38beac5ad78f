//! Append-only combat log.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::unit::UnitId;

/// Category of a logged combat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Periodic basic attack.
    AutoAttack,
    /// Damaging active ability.
    Ability,
    /// Ultimate ability, damaging or healing.
    Ultimate,
    /// Healing active ability.
    Heal,
    /// A unit was eliminated.
    Death,
}

/// One entry of the combat log.
///
/// For [`ActionKind::Death`] entries `actor` is the unit that died and
/// `target` is the unit that dealt the killing blow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatAction {
    /// Simulated time of the event.
    pub timestamp_ms: u64,
    /// Acting unit (or the unit that died).
    pub actor: UnitId,
    /// Event category.
    pub kind: ActionKind,
    /// Affected unit (or the killer).
    pub target: Option<UnitId>,
    /// Ability used, for ability, heal and ultimate entries.
    pub ability_id: Option<String>,
    /// Damage dealt or healing applied.
    #[serde(with = "fixed_serde")]
    pub amount: Fixed,
    /// Whether the auto-attack was a critical hit.
    pub critical: bool,
}

/// Ordered record of every combat event in a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<CombatAction>,
}

impl CombatLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, action: CombatAction) {
        tracing::trace!(
            at = action.timestamp_ms,
            actor = %action.actor,
            kind = ?action.kind,
            amount = action.amount.to_num::<f64>(),
            "combat action"
        );
        self.entries.push(action);
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[CombatAction] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: ActionKind) -> impl Iterator<Item = &CombatAction> {
        self.entries.iter().filter(move |a| a.kind == kind)
    }

    /// Consume the log, yielding its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<CombatAction> {
        self.entries
    }
}
