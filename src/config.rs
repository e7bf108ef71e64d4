//! Tunable rule constants.
//!
//! Defaults reproduce standard play. A JSON file may override any subset of
//! fields; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Luck draw used for forecasts: the midpoint of the 32-bit range.
pub const NEUTRAL_LUCK_DRAW: u32 = 0x8000_0000;

/// Rule constants consumed by the pathfinder and combat resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Attack bonus per veterancy rank 0..=3.
    pub rank_attack_bonus: [u16; 4],
    /// Defense bonus at the highest rank only.
    pub veteran_defense_bonus: u16,
    /// Attack and defense bonus per owned comm tower.
    pub comm_tower_bonus: u16,
    /// Luck draw used for estimates instead of the seeded roll.
    pub estimate_luck_draw: u32,
    /// Base damage of attacks against terrain structures.
    pub terrain_attack_base: u16,
    /// How many times route repair shortens the old path before a full search.
    pub route_retry_limit: u8,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rank_attack_bonus: [0, 5, 10, 20],
            veteran_defense_bonus: 20,
            comm_tower_bonus: 5,
            estimate_luck_draw: NEUTRAL_LUCK_DRAW,
            terrain_attack_base: 30,
            route_retry_limit: 2,
        }
    }
}

impl Rules {
    /// Parse rules from JSON text.
    ///
    /// # Errors
    ///
    /// [`LoadError::Json`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read rules from a JSON file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] if the file cannot be read, [`LoadError::Json`] if
    /// it does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Attack bonus for `rank`, saturating at the top rank.
    #[must_use]
    pub fn rank_bonus(&self, rank: u8) -> u16 {
        let top = self.rank_attack_bonus.len() - 1;
        self.rank_attack_bonus[usize::from(rank).min(top)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = Rules::default();
        assert_eq!(rules.rank_bonus(0), 0);
        assert_eq!(rules.rank_bonus(3), 20);
        assert_eq!(rules.rank_bonus(9), 20);
        assert_eq!(rules.route_retry_limit, 2);
    }

    #[test]
    fn test_partial_override() {
        let rules = Rules::from_json(r#"{ "comm_tower_bonus": 10 }"#).unwrap();
        assert_eq!(rules.comm_tower_bonus, 10);
        assert_eq!(rules.terrain_attack_base, 30);
    }

    #[test]
    fn test_rules_are_plain_values() {
        let rules = Rules::default();
        let mut tweaked = rules;
        tweaked.route_retry_limit = 0;
        assert_eq!(rules.route_retry_limit, 2);
        assert_eq!(tweaked.comm_tower_bonus, rules.comm_tower_bonus);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(Rules::from_json("[1, 2"), Err(LoadError::Json(_))));
    }
}
