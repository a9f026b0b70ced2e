//! Player state, inventory, leveling, and combat for the RuneQuest simulation.
//!
//! This crate contains the logic layer for the player -- everything that
//! operates on the player record without touching timers or I/O. It sits
//! between `runequest-types` (the data records) and `runequest-core` (the
//! engine that schedules actions and combat ticks).
//!
//! # Modules
//!
//! - [`combat`] -- Accuracy and max-hit formulas, one-tick combat resolution.
//! - [`config`] -- Tunable combat rewards ([`CombatConfig`]).
//! - [`error`] -- Error types for player operations ([`PlayerError`]).
//! - [`inventory`] -- Item stacks with clamping add and checked remove.
//! - [`leveling`] -- Experience-to-level table ([`level_info`]).
//! - [`skills`] -- Experience grants with level-up detection.
//! - [`state`] -- The mutable player record ([`PlayerState`]).

pub mod combat;
pub mod config;
pub mod error;
pub mod inventory;
pub mod leveling;
pub mod skills;
pub mod state;

// Re-export primary types at crate root for convenience.
pub use combat::{Swing, TickOutcome, TickReport, resolve_tick};
pub use config::CombatConfig;
pub use error::PlayerError;
pub use inventory::Inventory;
pub use leveling::{LevelInfo, MAX_LEVEL, level_for, level_info, xp_for_level};
pub use skills::ExperienceGain;
pub use state::{EquipChange, PlayerState};
