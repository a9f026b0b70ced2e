//! Default Lumbridge world: tile map, entity templates, items, locations.
//!
//! The [`WorldTemplate`] is the immutable bootstrap data handed to the
//! engine at construction time. Tests and alternative worlds build their own
//! templates with [`WorldTemplate::new`].

use std::collections::BTreeMap;

use runequest_types::{EntityId, EntityKind, Location, LocationId, Position, WorldEntity};

use crate::catalog::ItemCatalog;
use crate::error::WorldError;
use crate::tile_map::TileMap;

/// Location identifiers of the Lumbridge area.
pub mod locations {
    /// Starting location.
    pub const COURTYARD: &str = "lumbridge_courtyard";
    /// Oak trees.
    pub const FOREST: &str = "lumbridge_forest";
    /// Copper and tin rocks.
    pub const SWAMP: &str = "lumbridge_swamp";
    /// Smelting.
    pub const FORGE: &str = "lumbridge_forge";
}

/// Immutable world bootstrap data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldTemplate {
    /// Passability grid.
    map: TileMap,
    /// Entity templates in declaration order.
    entities: Vec<WorldEntity>,
    /// Item templates.
    items: ItemCatalog,
    /// Named locations keyed by id.
    locations: BTreeMap<LocationId, Location>,
}

impl WorldTemplate {
    /// Assemble a template from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateLocation`] if two locations share an id.
    pub fn new(
        map: TileMap,
        entities: Vec<WorldEntity>,
        items: ItemCatalog,
        locations: Vec<Location>,
    ) -> Result<Self, WorldError> {
        let mut by_id = BTreeMap::new();
        for location in locations {
            let id = location.id.clone();
            if by_id.insert(id.clone(), location).is_some() {
                return Err(WorldError::DuplicateLocation(id));
            }
        }
        Ok(Self {
            map,
            entities,
            items,
            locations: by_id,
        })
    }

    /// The passability grid.
    pub const fn map(&self) -> &TileMap {
        &self.map
    }

    /// Entity templates in declaration order.
    pub fn entities(&self) -> &[WorldEntity] {
        &self.entities
    }

    /// Item templates.
    pub const fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Look up a location.
    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Iterate over all locations in id order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }
}

/// Helper to build an entity template.
fn entity(id: &str, kind: EntityKind, subtype: Option<&str>, x: i32, y: i32, name: &str) -> WorldEntity {
    WorldEntity {
        id: EntityId::new(id),
        kind,
        subtype: subtype.map(str::to_owned),
        position: Position::new(x, y),
        name: name.to_owned(),
        hidden: false,
    }
}

/// Helper to build a [`Location`].
fn loc(id: &str, name: &str, description: &str, connections: &[&str]) -> Location {
    Location {
        id: LocationId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        connections: connections.iter().map(|&c| LocationId::new(c)).collect(),
    }
}

/// Create the default Lumbridge world.
pub fn create_starting_world() -> WorldTemplate {
    let entities = vec![
        entity("oak_1", EntityKind::Tree, Some("oak"), 5, 5, "Oak Tree"),
        entity("oak_2", EntityKind::Tree, Some("oak"), 6, 5, "Oak Tree"),
        entity("oak_3", EntityKind::Tree, Some("oak"), 5, 6, "Oak Tree"),
        entity("copper_1", EntityKind::Rock, Some("copper"), 15, 15, "Copper Rock"),
        entity("copper_2", EntityKind::Rock, Some("copper"), 16, 15, "Copper Rock"),
        entity("tin_1", EntityKind::Rock, Some("tin"), 14, 15, "Tin Rock"),
        entity("tin_2", EntityKind::Rock, Some("tin"), 14, 16, "Tin Rock"),
        entity("man_1", EntityKind::Npc, Some("man"), 10, 8, "Man"),
        entity("man_2", EntityKind::Npc, Some("man"), 11, 8, "Man"),
        entity("forge_1", EntityKind::Forge, None, 5, 15, "Lumbridge Forge"),
        entity("bank_1", EntityKind::Bank, Some("bank"), 10, 11, "Lumbridge Bank"),
    ];

    let mut by_id = BTreeMap::new();
    for location in [
        loc(
            locations::COURTYARD,
            "Lumbridge Courtyard",
            "The heart of Lumbridge. A few townsfolk wander about.",
            &[locations::FOREST, locations::FORGE],
        ),
        loc(
            locations::FOREST,
            "Lumbridge Forest",
            "A dense forest filled with oak trees.",
            &[locations::COURTYARD, locations::SWAMP],
        ),
        loc(
            locations::SWAMP,
            "Lumbridge Swamp",
            "A murky swamp with rich mineral deposits.",
            &[locations::FOREST],
        ),
        loc(
            locations::FORGE,
            "Lumbridge Forge",
            "A hot forge used for smelting and smithing.",
            &[locations::COURTYARD],
        ),
    ] {
        by_id.insert(location.id.clone(), location);
    }

    WorldTemplate {
        map: TileMap::lumbridge(),
        entities,
        items: ItemCatalog::standard(),
        locations: by_id,
    }
}
