//! Shared type definitions for the RuneQuest simulation.
//!
//! This crate is the single source of truth for the data records that cross
//! crate boundaries: the player record, inventory stacks, world entities, the
//! transient activity records, and the persistence rows. Types defined here
//! flow downstream to `TypeScript` via `ts-rs` for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe slug and UUID identifier wrappers
//! - [`enums`] -- Skills, item categories, entity kinds, tiles, action kinds
//! - [`structs`] -- Player stats, items, world entities, activity records, chat
//! - [`records`] -- Load/save records exchanged with the persistence store

pub mod enums;
pub mod ids;
pub mod records;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionKind, Combatant, EntityKind, ItemCategory, Skill, Tile};
pub use ids::{EntityId, ItemId, LocationId, MessageId};
pub use records::{
    DEFAULT_HP, DEFAULT_LOCATION, DEFAULT_SPAWN, InventoryRecord, LoadedPlayer, PlayerRecord,
    PlayerSnapshot,
};
pub use structs::{
    ActiveAction, ChatMessage, CombatSession, InventoryItem, ItemTemplate, Location,
    PlayerStats, Position, WorldEntity,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // ts-rs writes the `.ts` files to `bindings/` relative to the crate
        // root when `export_all` runs.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::EntityId::export_all();
        let _ = crate::ids::ItemId::export_all();
        let _ = crate::ids::LocationId::export_all();
        let _ = crate::ids::MessageId::export_all();

        // Enums
        let _ = crate::enums::Skill::export_all();
        let _ = crate::enums::ItemCategory::export_all();
        let _ = crate::enums::EntityKind::export_all();
        let _ = crate::enums::Tile::export_all();
        let _ = crate::enums::ActionKind::export_all();
        let _ = crate::enums::Combatant::export_all();

        // Structs
        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::PlayerStats::export_all();
        let _ = crate::structs::ItemTemplate::export_all();
        let _ = crate::structs::InventoryItem::export_all();
        let _ = crate::structs::WorldEntity::export_all();
        let _ = crate::structs::Location::export_all();
        let _ = crate::structs::ActiveAction::export_all();
        let _ = crate::structs::CombatSession::export_all();
        let _ = crate::structs::ChatMessage::export_all();

        // Records
        let _ = crate::records::PlayerRecord::export_all();
        let _ = crate::records::InventoryRecord::export_all();
        let _ = crate::records::LoadedPlayer::export_all();
        let _ = crate::records::PlayerSnapshot::export_all();
    }
}
