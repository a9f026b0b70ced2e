//! Registry of interactive world objects.
//!
//! The [`WorldEntityManager`] owns every [`WorldEntity`] loaded from the
//! static templates. Entities are never destroyed: harvesting hides them,
//! and a later respawn moves them to a random grass tile and reveals them
//! again. Scheduling the respawn is the engine's job; this module only
//! performs the state transitions.

use std::collections::BTreeMap;

use rand::Rng;
use runequest_types::{EntityId, Position, WorldEntity};
use tracing::{debug, warn};

use crate::error::WorldError;
use crate::tile_map::TileMap;

/// The mutable registry of world entities, keyed by identifier.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct WorldEntityManager {
    /// All entities, hidden or not.
    entities: BTreeMap<EntityId, WorldEntity>,
}

impl WorldEntityManager {
    /// Build the registry from template entities.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if two templates share an id.
    pub fn new(templates: impl IntoIterator<Item = WorldEntity>) -> Result<Self, WorldError> {
        let mut entities = BTreeMap::new();
        for entity in templates {
            let id = entity.id.clone();
            if entities.insert(id.clone(), entity).is_some() {
                return Err(WorldError::DuplicateEntity(id));
            }
        }
        Ok(Self { entities })
    }

    /// Look up an entity by identifier.
    pub fn get(&self, id: &EntityId) -> Option<&WorldEntity> {
        self.entities.get(id)
    }

    /// Number of registered entities, hidden ones included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over every entity, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = &WorldEntity> {
        self.entities.values()
    }

    /// Entities that are currently visible.
    pub fn list_visible(&self) -> Vec<&WorldEntity> {
        self.entities.values().filter(|e| !e.hidden).collect()
    }

    /// Hide a visible entity after it has been harvested.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] for unknown ids and
    /// [`WorldError::EntityHidden`] if the entity is already hidden.
    pub fn harvest(&mut self, id: &EntityId) -> Result<&WorldEntity, WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| WorldError::EntityNotFound(id.clone()))?;
        if entity.hidden {
            return Err(WorldError::EntityHidden(id.clone()));
        }
        entity.hidden = true;
        debug!(entity = %id, "entity harvested and hidden");
        Ok(entity)
    }

    /// Move a hidden entity to a random grass tile and reveal it.
    ///
    /// The candidate tiles are enumerated up front, so placement always
    /// terminates. On a map without grass the entity is revealed where it
    /// was. Respawning an entity that is already visible still relocates it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] for unknown ids.
    pub fn respawn(
        &mut self,
        id: &EntityId,
        map: &TileMap,
        rng: &mut impl Rng,
    ) -> Result<Position, WorldError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| WorldError::EntityNotFound(id.clone()))?;

        let candidates = map.spawnable_positions();
        if candidates.is_empty() {
            warn!(entity = %id, "no grass tile available, respawning in place");
        } else {
            let idx = rng.random_range(0..candidates.len());
            if let Some(&spot) = candidates.get(idx) {
                entity.position = spot;
            }
        }
        entity.hidden = false;
        debug!(entity = %id, position = %entity.position, "entity respawned");
        Ok(entity.position)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use runequest_types::{EntityKind, Tile};

    use super::*;

    fn tree(id: &str, x: i32, y: i32) -> WorldEntity {
        WorldEntity {
            id: EntityId::new(id),
            kind: EntityKind::Tree,
            subtype: Some("oak".to_owned()),
            position: Position::new(x, y),
            name: "Oak Tree".to_owned(),
            hidden: false,
        }
    }

    fn registry() -> WorldEntityManager {
        WorldEntityManager::new(vec![tree("oak_1", 5, 5), tree("oak_2", 6, 5)]).unwrap()
    }

    #[test]
    fn duplicate_templates_are_rejected() {
        let result = WorldEntityManager::new(vec![tree("oak_1", 5, 5), tree("oak_1", 6, 5)]);
        assert!(matches!(result, Err(WorldError::DuplicateEntity(_))));
    }

    #[test]
    fn harvest_hides_entity() {
        let mut world = registry();
        let id = EntityId::new("oak_1");
        world.harvest(&id).unwrap();
        assert!(world.get(&id).unwrap().hidden);
        assert_eq!(world.list_visible().len(), 1);
    }

    #[test]
    fn harvest_twice_fails() {
        let mut world = registry();
        let id = EntityId::new("oak_1");
        world.harvest(&id).unwrap();
        assert!(matches!(world.harvest(&id), Err(WorldError::EntityHidden(_))));
    }

    #[test]
    fn harvest_unknown_fails() {
        let mut world = registry();
        let result = world.harvest(&EntityId::new("willow_9"));
        assert!(matches!(result, Err(WorldError::EntityNotFound(_))));
    }

    #[test]
    fn respawn_reveals_on_grass() {
        let mut world = registry();
        let map = TileMap::lumbridge();
        let id = EntityId::new("oak_1");
        let mut rng = SmallRng::seed_from_u64(7);
        world.harvest(&id).unwrap();

        let pos = world.respawn(&id, &map, &mut rng).unwrap();

        let entity = world.get(&id).unwrap();
        assert!(!entity.hidden);
        assert_eq!(entity.position, pos);
        assert_eq!(map.tile(pos), Some(Tile::Grass));
    }

    #[test]
    fn respawn_is_deterministic_for_a_seed() {
        let map = TileMap::lumbridge();
        let id = EntityId::new("oak_1");

        let mut a = registry();
        let mut b = registry();
        let pa = a.respawn(&id, &map, &mut SmallRng::seed_from_u64(99)).unwrap();
        let pb = b.respawn(&id, &map, &mut SmallRng::seed_from_u64(99)).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn respawn_without_grass_keeps_position() {
        let mut world = registry();
        let map = TileMap::new(3, 3, vec![Tile::Water; 9]).unwrap();
        let id = EntityId::new("oak_2");
        let mut rng = SmallRng::seed_from_u64(1);
        world.harvest(&id).unwrap();

        let pos = world.respawn(&id, &map, &mut rng).unwrap();

        assert_eq!(pos, Position::new(6, 5));
        assert!(!world.get(&id).unwrap().hidden);
    }

    #[test]
    fn many_respawns_always_land_on_grass() {
        let mut world = registry();
        let map = TileMap::lumbridge();
        let id = EntityId::new("oak_1");
        let mut rng = SmallRng::seed_from_u64(2024);
        for _ in 0..200 {
            world.harvest(&id).unwrap();
            let pos = world.respawn(&id, &map, &mut rng).unwrap();
            assert!(map.tile(pos).is_some_and(Tile::is_spawnable));
        }
    }
}
