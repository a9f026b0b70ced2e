//! Error types for the `runequest-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use runequest_types::{EntityId, ItemId, LocationId};

/// Errors that can occur during world registry and map operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No entity with this identifier is registered.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity is hidden and waiting to respawn.
    #[error("entity {0} is hidden")]
    EntityHidden(EntityId),

    /// Two entity templates share an identifier.
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(EntityId),

    /// Two item templates share an identifier.
    #[error("duplicate item id: {0}")]
    DuplicateItem(ItemId),

    /// Two locations share an identifier.
    #[error("duplicate location id: {0}")]
    DuplicateLocation(LocationId),

    /// The tile grid does not match its declared dimensions.
    #[error("invalid tile map: {reason}")]
    InvalidMap {
        /// Explanation of what is wrong with the grid.
        reason: String,
    },
}
