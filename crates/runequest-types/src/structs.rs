//! Core entity structs for the RuneQuest simulation.
//!
//! Covers the player record (`PlayerStats`, `InventoryItem`), the world
//! registry entries (`WorldEntity`, `Location`), the transient activity
//! records (`ActiveAction`, `CombatSession`), and chat messages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, EntityKind, ItemCategory, Skill};
use crate::ids::{EntityId, ItemId, LocationId, MessageId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl Position {
    /// Construct a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position, returning `None` on `i32` overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        Some(Self { x, y })
    }

    /// Euclidean distance in tiles.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Mutable player statistics.
///
/// `hp` stays within `0..=max_hp`. Experience only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerStats {
    /// Current hitpoints.
    pub hp: u32,
    /// Maximum hitpoints.
    pub max_hp: u32,
    /// Accumulated experience per skill. Missing skills count as zero.
    pub xp: BTreeMap<Skill, u64>,
    /// Coins carried.
    pub gold: u64,
    /// Tile the player stands on.
    pub position: Position,
}

impl PlayerStats {
    /// Experience accumulated in `skill`.
    pub fn xp_for(&self, skill: Skill) -> u64 {
        self.xp.get(&skill).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Static description of an item, shared by every stack of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemTemplate {
    /// Stable item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Display glyph.
    pub icon: String,
    /// Item category.
    pub category: ItemCategory,
    /// Hitpoints restored when consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<u32>,
    /// Attack bonus shown on equipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_bonus: Option<i32>,
    /// Strength bonus shown on equipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_bonus: Option<i32>,
    /// Defence bonus shown on equipment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defence_bonus: Option<i32>,
    /// Flat bonus added to the max hit while this item is equipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hit_bonus: Option<u32>,
    /// Attack or tool speed in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_ms: Option<u64>,
    /// Shop price in gold, if the item is for sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

/// One inventory stack: an item template plus a quantity.
///
/// A stack whose quantity drops to zero is kept; display code filters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryItem {
    /// The item this stack holds.
    pub template: ItemTemplate,
    /// Number of units held.
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// An interactive object placed on the world grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldEntity {
    /// Stable identifier.
    pub id: EntityId,
    /// What kind of object this is.
    pub kind: EntityKind,
    /// Finer classification (`"oak"`, `"copper"`, `"man"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Grid position.
    pub position: Position,
    /// Display name.
    pub name: String,
    /// Hidden entities are waiting to respawn and cannot be interacted with.
    #[serde(default)]
    pub hidden: bool,
}

/// A named area the player can travel between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Stable identifier (the persisted location tag).
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Locations reachable from here.
    pub connections: Vec<LocationId>,
}

// ---------------------------------------------------------------------------
// Transient activity records
// ---------------------------------------------------------------------------

/// The timed action currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveAction {
    /// What the player is doing.
    pub kind: ActionKind,
    /// Completion percentage, `0..=100`.
    pub progress: u32,
}

/// The enemy the player is currently fighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CombatSession {
    /// Display name of the enemy.
    pub enemy: String,
    /// Remaining enemy hitpoints. May dip below zero on the killing blow.
    pub hp: i32,
    /// Enemy hitpoints at the start of the fight.
    pub max_hp: i32,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A posted chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: MessageId,
    /// Author name.
    pub username: String,
    /// Message body.
    pub message: String,
    /// When the message was posted.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn offset_detects_overflow() {
        assert_eq!(Position::new(1, 1).offset(1, -1), Some(Position::new(2, 0)));
        assert_eq!(Position::new(i32::MAX, 0).offset(1, 0), None);
    }

    #[test]
    fn missing_skill_xp_reads_as_zero() {
        let stats = PlayerStats {
            hp: 10,
            max_hp: 10,
            xp: BTreeMap::new(),
            gold: 0,
            position: Position::default(),
        };
        assert_eq!(stats.xp_for(Skill::Mining), 0);
    }
}
