//! Plain data records exchanged with the persistence collaborator.
//!
//! The engine never talks to storage directly. It is handed a
//! [`LoadedPlayer`] at session start and produces [`PlayerSnapshot`]s on the
//! autosave period; what the store does with them is its own business.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Skill;
use crate::ids::{ItemId, LocationId};
use crate::structs::Position;

/// Hitpoints of a freshly created player.
pub const DEFAULT_HP: u32 = 10;

/// Spawn tile of a freshly created player.
pub const DEFAULT_SPAWN: Position = Position::new(10, 10);

/// Location tag of a freshly created player.
pub const DEFAULT_LOCATION: &str = "lumbridge_courtyard";

/// The persisted stats row of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerRecord {
    /// Current hitpoints.
    pub hp: u32,
    /// Maximum hitpoints.
    pub max_hp: u32,
    /// Coins carried.
    pub gold: u64,
    /// Location tag.
    pub location: LocationId,
    /// Grid position.
    pub position: Position,
    /// Experience per skill.
    #[serde(default)]
    pub xp: BTreeMap<Skill, u64>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            hp: DEFAULT_HP,
            max_hp: DEFAULT_HP,
            gold: 0,
            location: LocationId::from(DEFAULT_LOCATION),
            position: DEFAULT_SPAWN,
            xp: Skill::ALL.iter().map(|&skill| (skill, 0)).collect(),
        }
    }
}

/// One persisted inventory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryRecord {
    /// Item identifier. Rows whose id has no template are dropped on load.
    pub item_id: ItemId,
    /// Stack size.
    pub quantity: u32,
}

/// What the store returns for a load request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LoadedPlayer {
    /// Stats row.
    pub player: PlayerRecord,
    /// Inventory rows.
    #[serde(default)]
    pub inventory: Vec<InventoryRecord>,
}

/// Read-only snapshot of the player state handed to the store on save.
///
/// The store replaces the persisted inventory with `inventory` wholesale
/// and upserts the stats row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSnapshot {
    /// Player name the snapshot belongs to.
    pub username: String,
    /// Stats row.
    pub player: PlayerRecord,
    /// Full inventory, zero-quantity stacks included.
    pub inventory: Vec<InventoryRecord>,
    /// Engine virtual time when the snapshot was taken.
    pub taken_at_ms: u64,
    /// Wall-clock time when the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl PlayerSnapshot {
    /// Convert the snapshot into the shape a later load returns.
    pub fn into_loaded(self) -> LoadedPlayer {
        LoadedPlayer {
            player: self.player,
            inventory: self.inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_matches_new_player() {
        let record = PlayerRecord::default();
        assert_eq!(record.hp, 10);
        assert_eq!(record.max_hp, 10);
        assert_eq!(record.gold, 0);
        assert_eq!(record.position, Position::new(10, 10));
        assert_eq!(record.location.as_str(), "lumbridge_courtyard");
        assert_eq!(record.xp.len(), Skill::ALL.len());
    }

    #[test]
    fn loaded_player_tolerates_missing_inventory() {
        let json = r#"{"player":{"hp":7,"max_hp":10,"gold":3,"location":"lumbridge_forest","position":{"x":4,"y":5}}}"#;
        let loaded: LoadedPlayer = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(loaded.player.hp, 7);
        assert!(loaded.inventory.is_empty());
        assert!(loaded.player.xp.is_empty());
    }
}
