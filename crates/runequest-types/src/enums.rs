//! Enumeration types for the RuneQuest simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// One of the six independently leveled abilities.
///
/// Each skill maps to its own experience counter in
/// [`PlayerStats::xp`](crate::PlayerStats::xp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Skill {
    /// Melee accuracy.
    Attack,
    /// Melee max hit.
    Strength,
    /// Reduces the chance of being hit.
    Defence,
    /// Gathering ore from rocks.
    Mining,
    /// Gathering logs from trees.
    Woodcutting,
    /// Smelting and forging metal.
    Smithing,
}

impl Skill {
    /// Every skill, in display order.
    pub const ALL: [Self; 6] = [
        Self::Attack,
        Self::Strength,
        Self::Defence,
        Self::Mining,
        Self::Woodcutting,
        Self::Smithing,
    ];

    /// Lowercase skill name as used in log lines and persisted rows.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Strength => "strength",
            Self::Defence => "defence",
            Self::Mining => "mining",
            Self::Woodcutting => "woodcutting",
            Self::Smithing => "smithing",
        }
    }
}

impl core::fmt::Display for Skill {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Broad category of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemCategory {
    /// Raw or refined material (logs, ore, bars).
    Resource,
    /// Wieldable gear (weapons, tools).
    Equipment,
    /// Food and potions.
    Consumable,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Kind of an interactive world entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// Choppable tree; hidden when harvested.
    Tree,
    /// Mineable rock.
    Rock,
    /// Attackable non-player character.
    Npc,
    /// Smelting station.
    Forge,
    /// Bank booth; also the shop counter.
    Bank,
}

impl EntityKind {
    /// Whether harvesting this kind of entity depletes it until respawn.
    pub const fn depletes_on_harvest(self) -> bool {
        matches!(self, Self::Tree)
    }
}

/// A single cell of the world tile map.
///
/// Persisted and configured as the numeric codes `0` (grass), `1` (water),
/// and `2` (path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Tile {
    /// Open ground. Walkable, and the only tile respawns may land on.
    Grass,
    /// Impassable water or wall.
    Water,
    /// Walkable road.
    Path,
}

impl Tile {
    /// Decode a numeric map code. Unknown codes are treated as impassable.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Grass,
            2 => Self::Path,
            _ => Self::Water,
        }
    }

    /// Return the numeric map code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Grass => 0,
            Self::Water => 1,
            Self::Path => 2,
        }
    }

    /// Whether the player may stand on this tile.
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Whether a respawning entity may be placed on this tile.
    pub const fn is_spawnable(self) -> bool {
        matches!(self, Self::Grass)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Kind of a timed, mutually exclusive activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// Chopping a tree.
    Woodcutting,
    /// Mining a rock.
    Mining,
    /// Smelting ore at the forge.
    Smithing,
    /// Walking to another location.
    Traveling,
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Woodcutting => "Woodcutting",
            Self::Mining => "Mining",
            Self::Smithing => "Smithing",
            Self::Traveling => "Traveling",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// Which side of a fight received a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Combatant {
    /// The player character.
    Player,
    /// The current enemy.
    Enemy,
}
