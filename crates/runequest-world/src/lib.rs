//! Geography, world entities, and static item data for the RuneQuest simulation.
//!
//! This crate models the physical world: the passability grid the player
//! walks on, the registry of interactive entities with their harvest/respawn
//! lifecycle, and the immutable bootstrap data (item templates, locations)
//! the engine is constructed from.
//!
//! # Modules
//!
//! - [`catalog`] -- [`ItemCatalog`] of static item templates.
//! - [`entities`] -- [`WorldEntityManager`]: hide-on-harvest and randomized
//!   respawn of world entities.
//! - [`error`] -- Error types for world operations.
//! - [`starting_world`] -- Default Lumbridge [`WorldTemplate`].
//! - [`tile_map`] -- [`TileMap`] passability grid.

pub mod catalog;
pub mod entities;
pub mod error;
pub mod starting_world;
pub mod tile_map;

// Re-export primary types at crate root.
pub use catalog::{BRONZE_SWORD_MAX_HIT_BONUS, HEALING_POTION_PRICE, ItemCatalog, items};
pub use entities::WorldEntityManager;
pub use error::WorldError;
pub use starting_world::{WorldTemplate, create_starting_world, locations};
pub use tile_map::TileMap;
