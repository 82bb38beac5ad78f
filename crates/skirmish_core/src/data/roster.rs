//! Read-only hero roster lookup.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::hero_data::{AbilityKind, HeroDefinition, MAX_STAT_VALUE};
use crate::error::{BattleError, Result};

/// Read-only lookup table of hero definitions keyed by hero id.
///
/// Supplied by an external content collaborator. The engine borrows it for
/// the duration of a battle and never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HeroDefinition>", into = "Vec<HeroDefinition>")]
pub struct HeroRoster {
    heroes: BTreeMap<String, HeroDefinition>,
}

impl HeroRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a hero definition.
    pub fn insert(&mut self, hero: HeroDefinition) {
        self.heroes.insert(hero.id.clone(), hero);
    }

    /// Look up a hero by id.
    #[must_use]
    pub fn get(&self, hero_id: &str) -> Option<&HeroDefinition> {
        self.heroes.get(hero_id)
    }

    /// Look up a hero by id, failing with [`BattleError::HeroNotFound`].
    pub fn require(&self, hero_id: &str) -> Result<&HeroDefinition> {
        self.get(hero_id)
            .ok_or_else(|| BattleError::HeroNotFound(hero_id.to_string()))
    }

    /// Check if a hero id is present.
    #[must_use]
    pub fn contains(&self, hero_id: &str) -> bool {
        self.heroes.contains_key(hero_id)
    }

    /// Number of heroes in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    /// Iterate over heroes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &HeroDefinition> {
        self.heroes.values()
    }

    /// Parse a roster from RON text containing a list of hero definitions.
    ///
    /// Duplicate ids are rejected here because the map would otherwise keep
    /// only the last definition silently.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let heroes: Vec<HeroDefinition> =
            ron::from_str(text).map_err(|e| BattleError::DataParse {
                source_name: source_name.to_string(),
                message: e.to_string(),
            })?;

        let mut seen = BTreeSet::new();
        let duplicates: Vec<String> = heroes
            .iter()
            .filter(|h| !seen.insert(h.id.clone()))
            .map(|h| format!("duplicate hero id '{}'", h.id))
            .collect();
        if !duplicates.is_empty() {
            return Err(BattleError::InvalidRoster(duplicates));
        }

        Ok(Self::from(heroes))
    }

    /// Check roster content for problems the engine cannot simulate sensibly.
    ///
    /// Returns every problem found, not just the first.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        for hero in self.heroes.values() {
            if hero.stats.health == 0 {
                problems.push(format!("hero '{}' has zero health", hero.id));
            }

            let stats = &hero.stats;
            for (name, value) in [
                ("health", stats.health),
                ("shield", stats.shield),
                ("energy", stats.energy),
                ("attack_damage", stats.attack_damage),
                ("armor", stats.armor),
                ("magic_resist", stats.magic_resist),
            ] {
                if value > MAX_STAT_VALUE {
                    problems.push(format!(
                        "hero '{}' {name} {value} exceeds {MAX_STAT_VALUE}",
                        hero.id
                    ));
                }
            }

            let ultimates = hero
                .abilities
                .iter()
                .filter(|a| a.kind == AbilityKind::Ultimate)
                .count();
            if ultimates > 1 {
                problems.push(format!(
                    "hero '{}' declares {ultimates} ultimates (at most 1)",
                    hero.id
                ));
            }

            let mut ability_ids = BTreeSet::new();
            for ability in &hero.abilities {
                if !ability_ids.insert(ability.id.as_str()) {
                    problems.push(format!(
                        "hero '{}' has duplicate ability id '{}'",
                        hero.id, ability.id
                    ));
                }
                let amount = ability.damage.max(ability.healing).unwrap_or(0);
                if amount > MAX_STAT_VALUE {
                    problems.push(format!(
                        "hero '{}' ability '{}' amount {amount} exceeds {MAX_STAT_VALUE}",
                        hero.id, ability.id
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BattleError::InvalidRoster(problems))
        }
    }
}

impl From<Vec<HeroDefinition>> for HeroRoster {
    fn from(heroes: Vec<HeroDefinition>) -> Self {
        let mut roster = Self::new();
        for hero in heroes {
            roster.insert(hero);
        }
        roster
    }
}

impl From<HeroRoster> for Vec<HeroDefinition> {
    fn from(roster: HeroRoster) -> Self {
        roster.heroes.into_values().collect()
    }
}

impl FromIterator<HeroDefinition> for HeroRoster {
    fn from_iter<I: IntoIterator<Item = HeroDefinition>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
