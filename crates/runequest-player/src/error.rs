//! Error types for the runequest-player crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Rejections that the engine treats as silent no-ops (unknown item ids,
//! blocked moves) are still reported here so callers can log them.

use runequest_types::{ItemId, Position, Skill};

/// Errors that can occur during player state operations.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The item id has no template in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// Attempted to remove more of an item than the player holds.
    #[error("insufficient quantity: wanted {requested} of {item} but only have {available}")]
    InsufficientQuantity {
        /// The item being removed.
        item: ItemId,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity the player actually holds.
        available: u32,
    },

    /// The item cannot be used this way (no heal effect, not equipment).
    #[error("item {item} cannot be {verb}")]
    NotUsable {
        /// The item.
        item: ItemId,
        /// What was attempted ("used", "equipped").
        verb: &'static str,
    },

    /// The player does not have enough gold.
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        /// Gold required.
        required: u64,
        /// Gold carried.
        available: u64,
    },

    /// The destination is off the map or impassable.
    #[error("cannot move to {to}")]
    Blocked {
        /// The rejected destination.
        to: Position,
    },

    /// Experience counter would overflow.
    #[error("experience overflow for skill {0}")]
    ExperienceOverflow(Skill),

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
