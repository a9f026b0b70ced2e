//! Tunable combat parameters.
//!
//! Deserialized from the `combat` section of `runequest-config.yaml`. Every
//! field has a default so a partial section is valid.

use runequest_types::ItemId;
use runequest_world::items;
use serde::{Deserialize, Serialize};

/// Rewards and enemy parameters used by the combat tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Attack experience granted for every landed hit (default: 4).
    #[serde(default = "default_attack_xp_per_hit")]
    pub attack_xp_per_hit: u64,

    /// Extra attack experience for defeating an enemy (default: 10).
    #[serde(default = "default_defeat_bonus_xp")]
    pub defeat_bonus_xp: u64,

    /// Defence experience granted for every hit taken (default: 2).
    #[serde(default = "default_defence_xp_per_hit")]
    pub defence_xp_per_hit: u64,

    /// Item dropped by a defeated enemy (default: `shrimp`).
    #[serde(default = "default_loot_item")]
    pub loot_item: ItemId,

    /// Quantity of the loot item dropped (default: 1).
    #[serde(default = "default_loot_quantity")]
    pub loot_quantity: u32,

    /// Minimum gold dropped, inclusive (default: 5).
    #[serde(default = "default_gold_min")]
    pub gold_min: u64,

    /// Maximum gold dropped, inclusive (default: 14).
    #[serde(default = "default_gold_max")]
    pub gold_max: u64,

    /// Enemy maximum hit (default: 2). Enemy hits roll `1..=enemy_max_hit`.
    #[serde(default = "default_enemy_max_hit")]
    pub enemy_max_hit: u32,

    /// Starting hitpoints of an NPC opponent (default: 15).
    #[serde(default = "default_npc_hp")]
    pub npc_hp: i32,
}

const fn default_attack_xp_per_hit() -> u64 {
    4
}

const fn default_defeat_bonus_xp() -> u64 {
    10
}

const fn default_defence_xp_per_hit() -> u64 {
    2
}

fn default_loot_item() -> ItemId {
    ItemId::new(items::SHRIMP)
}

const fn default_loot_quantity() -> u32 {
    1
}

const fn default_gold_min() -> u64 {
    5
}

const fn default_gold_max() -> u64 {
    14
}

const fn default_enemy_max_hit() -> u32 {
    2
}

const fn default_npc_hp() -> i32 {
    15
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_xp_per_hit: default_attack_xp_per_hit(),
            defeat_bonus_xp: default_defeat_bonus_xp(),
            defence_xp_per_hit: default_defence_xp_per_hit(),
            loot_item: default_loot_item(),
            loot_quantity: default_loot_quantity(),
            gold_min: default_gold_min(),
            gold_max: default_gold_max(),
            enemy_max_hit: default_enemy_max_hit(),
            npc_hp: default_npc_hp(),
        }
    }
}

impl CombatConfig {
    /// Check internal consistency.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Option<String> {
        if self.gold_min > self.gold_max {
            return Some(format!(
                "combat.gold_min ({}) exceeds combat.gold_max ({})",
                self.gold_min, self.gold_max
            ));
        }
        if self.enemy_max_hit == 0 {
            return Some(String::from("combat.enemy_max_hit must be at least 1"));
        }
        if self.npc_hp <= 0 {
            return Some(String::from("combat.npc_hp must be positive"));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = CombatConfig::default();
        assert_eq!(config.attack_xp_per_hit, 4);
        assert_eq!(config.gold_min..=config.gold_max, 5..=14);
        assert!(config.check().is_none());
    }

    #[test]
    fn inverted_gold_range_is_reported() {
        let config = CombatConfig {
            gold_min: 20,
            gold_max: 10,
            ..CombatConfig::default()
        };
        assert!(config.check().is_some());
    }
}
