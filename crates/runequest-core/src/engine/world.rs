//! World-facing commands: harvest and respawn, consumables, equipment, shop.

use rand::Rng;
use runequest_player::{EquipChange, PlayerError};
use runequest_types::{EntityId, EntityKind, ItemId};
use tracing::{debug, info, warn};

use super::{GameEngine, TimerKind};
use crate::events::EngineEvent;

impl<R: Rng> GameEngine<R> {
    /// Hide an entity and schedule its respawn.
    ///
    /// Only kinds that deplete on harvest (trees) are hidden. Returns
    /// whether the entity was hidden.
    pub fn harvest(&mut self, id: &EntityId) -> bool {
        let depletes = self
            .entities
            .get(id)
            .is_some_and(|e| e.kind.depletes_on_harvest());
        if !depletes {
            return false;
        }
        if let Err(err) = self.entities.harvest(id) {
            debug!(entity = %id, error = %err, "harvest skipped");
            return false;
        }
        if let Some(timer) = self.schedule(self.config.timing.respawn_delay_ms, false, TimerKind::Respawn(id.clone())) {
            if let Some(stale) = self.respawns.insert(id.clone(), timer) {
                self.scheduler.cancel(stale);
            }
        }
        self.events.push(EngineEvent::EntityHidden { id: id.clone() });
        true
    }

    /// Handle a respawn timer.
    pub(super) fn on_respawn(&mut self, id: &EntityId) {
        self.respawns.remove(id);
        match self.entities.respawn(id, self.world.map(), &mut self.rng) {
            Ok(position) => {
                if self.entities.get(id).is_some_and(|e| e.kind == EntityKind::Tree) {
                    self.log.push("A tree has regrown somewhere in the world.");
                }
                self.events.push(EngineEvent::EntityRespawned {
                    id: id.clone(),
                    position,
                });
                info!(entity = %id, position = %position, "entity respawned");
            }
            Err(err) => warn!(entity = %id, error = %err, "respawn failed"),
        }
    }

    /// Consume one healing item.
    pub fn use_item(&mut self, id: &ItemId) -> bool {
        let name = self
            .world
            .items()
            .get(id)
            .map_or_else(|| id.to_string(), |t| t.name.clone());
        match self.player.use_item(id) {
            Ok(healed) => {
                self.log.push(format!("You used a {name} and healed for {healed} HP."));
                true
            }
            Err(err) => {
                debug!(item = %id, error = %err, "use rejected");
                false
            }
        }
    }

    /// Equip a held equipment item, or unequip it if already equipped.
    pub fn toggle_equip(&mut self, id: &ItemId) -> bool {
        match self.player.toggle_equip(id) {
            Ok(change) => {
                let name = self
                    .world
                    .items()
                    .get(id)
                    .map_or_else(|| id.to_string(), |t| t.name.clone());
                let line = match change {
                    EquipChange::Equipped => format!("You equip the {name}."),
                    EquipChange::Unequipped => format!("You unequip the {name}."),
                };
                self.log.push(line);
                true
            }
            Err(err) => {
                debug!(item = %id, error = %err, "equip rejected");
                false
            }
        }
    }

    /// Buy one item at a nearby bank.
    ///
    /// Only items with a price can be bought. Insufficient gold is logged.
    pub fn buy(&mut self, id: &ItemId) -> bool {
        if !self.near_station(EntityKind::Bank) {
            debug!(item = %id, "buy rejected: no bank nearby");
            return false;
        }
        let Some((name, price)) = self
            .world
            .items()
            .get(id)
            .and_then(|t| t.price.map(|price| (t.name.to_lowercase(), price)))
        else {
            debug!(item = %id, "buy rejected: not for sale");
            return false;
        };
        match self.player.spend_gold(price) {
            Ok(_) => {
                self.add_item(id, 1);
                self.log.push(format!("You bought a {name} for {price} GP."));
                true
            }
            Err(PlayerError::InsufficientGold { .. }) => {
                self.log.push("You don't have enough gold!");
                false
            }
            Err(err) => {
                warn!(item = %id, error = %err, "purchase failed");
                false
            }
        }
    }
}
