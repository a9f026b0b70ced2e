//! Skilling actions: woodcutting, mining, smelting, travel.
//!
//! Each action is started through [`GameEngine::start_action`] with an
//! [`ActionEffect`] that is applied once, when the action reaches 100.
//! Inputs consumed by the effect (ore for smelting) are checked at start
//! and removed with the checked inventory path on completion, so a bar is
//! only produced if both ores are still there.

use rand::Rng;
use runequest_types::{ActionKind, EntityId, EntityKind, ItemId, LocationId, Skill};
use runequest_world::items;
use tracing::{debug, info, warn};

use super::{GameEngine, TimerKind};
use crate::action::{ActionStep, PROGRESS_COMPLETE};
use crate::events::EngineEvent;

/// Maximum Euclidean distance at which the player can interact with an
/// entity.
pub const INTERACT_RANGE: f64 = 1.5;

/// The player must be strictly closer than this to a forge to smelt or to
/// a bank to buy.
pub const STATION_RANGE: f64 = 2.0;

/// What happens when a timed action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionEffect {
    /// Take a log and fell the tree.
    Chop {
        /// The tree being cut.
        tree: EntityId,
    },
    /// Take one ore.
    Mine {
        /// Ore produced.
        ore: ItemId,
    },
    /// Turn one copper and one tin ore into a bronze bar.
    Smelt,
    /// Arrive at a named location.
    Travel {
        /// Where the player ends up.
        destination: LocationId,
    },
}

impl<R: Rng> GameEngine<R> {
    /// Start a timed action.
    ///
    /// Returns `false` and changes nothing while an action or combat
    /// session exists. The completion effect runs exactly once, after
    /// `duration_ms` of virtual time, unless the action is cancelled.
    pub fn start_action(&mut self, kind: ActionKind, duration_ms: u64, effect: ActionEffect) -> bool {
        if self.shut_down || self.combat.is_some() {
            debug!(kind = %kind, "action rejected: in combat");
            return false;
        }
        if !self.actions.start(kind, duration_ms, effect) {
            debug!(kind = %kind, "action rejected: another action is running");
            return false;
        }
        let Some(timer) = self.schedule(self.actions.step_ms(), true, TimerKind::ActionStep) else {
            self.actions.cancel();
            return false;
        };
        self.action_timer = Some(timer);
        self.events.push(EngineEvent::ActionStarted { kind });
        info!(kind = %kind, duration_ms, "action started");
        true
    }

    /// Clear the running action without applying its effect.
    pub fn cancel_action(&mut self) -> bool {
        let Some(kind) = self.actions.cancel() else {
            return false;
        };
        self.stop_action_timer();
        self.events.push(EngineEvent::ActionCancelled { kind });
        info!(kind = %kind, "action cancelled");
        true
    }

    /// Interact with a world entity.
    ///
    /// Hidden and unknown entities are ignored. The player must stand
    /// within [`INTERACT_RANGE`]. Trees start woodcutting, rocks start
    /// mining, NPCs start combat, banks and forges print guidance.
    pub fn interact(&mut self, id: &EntityId) -> bool {
        let Some(entity) = self.entities.get(id).filter(|e| !e.hidden) else {
            debug!(entity = %id, "interaction ignored: no visible entity");
            return false;
        };
        let (kind, name, subtype, position) =
            (entity.kind, entity.name.clone(), entity.subtype.clone(), entity.position);

        if self.player.stats.position.distance(position) > INTERACT_RANGE {
            self.log.push(format!("You are too far from the {name}."));
            return false;
        }

        match kind {
            EntityKind::Tree => self.start_action(
                ActionKind::Woodcutting,
                self.config.actions.woodcutting_ms,
                ActionEffect::Chop { tree: id.clone() },
            ),
            EntityKind::Rock => {
                let ore = match subtype.as_deref() {
                    Some("copper") => items::COPPER_ORE,
                    Some("tin") => items::TIN_ORE,
                    other => {
                        warn!(entity = %id, subtype = ?other, "rock has no known ore");
                        return false;
                    }
                };
                self.start_action(
                    ActionKind::Mining,
                    self.config.actions.mining_ms,
                    ActionEffect::Mine { ore: ItemId::new(ore) },
                )
            }
            EntityKind::Npc => {
                let hp = self.config.combat.npc_hp;
                self.start_combat(&name, hp)
            }
            EntityKind::Bank => {
                self.log.push("You accessed the bank. Healing potions are for sale here.");
                true
            }
            EntityKind::Forge => {
                self.log.push("Stand by the forge with copper and tin ore to smelt bronze.");
                true
            }
        }
    }

    /// Smelt a bronze bar at a nearby forge.
    ///
    /// Requires a visible forge within [`STATION_RANGE`] and at least one
    /// copper and one tin ore at start.
    pub fn smelt(&mut self) -> bool {
        if !self.near_station(EntityKind::Forge) {
            debug!("smelt rejected: no forge nearby");
            return false;
        }
        if self.is_busy() {
            debug!("smelt rejected: player is busy");
            return false;
        }
        let inventory = &self.player.inventory;
        if !inventory.has(&ItemId::new(items::COPPER_ORE), 1) || !inventory.has(&ItemId::new(items::TIN_ORE), 1) {
            self.log.push("You need copper and tin ore to smelt bronze.");
            return false;
        }
        self.start_action(ActionKind::Smithing, self.config.actions.smithing_ms, ActionEffect::Smelt)
    }

    /// Travel to a named location.
    ///
    /// Unknown locations are rejected.
    pub fn travel(&mut self, destination: &LocationId) -> bool {
        if self.world.location(destination).is_none() {
            debug!(destination = %destination, "travel rejected: unknown location");
            return false;
        }
        self.start_action(
            ActionKind::Traveling,
            self.config.actions.travel_ms,
            ActionEffect::Travel {
                destination: destination.clone(),
            },
        )
    }

    /// Whether a visible entity of `kind` stands within [`STATION_RANGE`].
    pub(super) fn near_station(&self, kind: EntityKind) -> bool {
        let here = self.player.stats.position;
        self.entities
            .list_visible()
            .iter()
            .any(|e| e.kind == kind && here.distance(e.position) < STATION_RANGE)
    }

    /// Handle one action step timer.
    pub(super) fn on_action_step(&mut self) {
        match self.actions.step() {
            ActionStep::Idle => self.stop_action_timer(),
            ActionStep::Progress(action) => self.events.push(EngineEvent::ActionProgress {
                kind: action.kind,
                progress: action.progress,
            }),
            ActionStep::Completed { kind, effect } => {
                self.stop_action_timer();
                self.events.push(EngineEvent::ActionProgress {
                    kind,
                    progress: PROGRESS_COMPLETE,
                });
                self.complete(effect);
                self.events.push(EngineEvent::ActionCompleted { kind });
                info!(kind = %kind, "action completed");
            }
        }
    }

    fn stop_action_timer(&mut self) {
        if let Some(timer) = self.action_timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    /// Apply a completion effect.
    fn complete(&mut self, effect: ActionEffect) {
        match effect {
            ActionEffect::Chop { tree } => {
                self.add_item(&ItemId::new(items::WOOD), 1);
                self.grant(Skill::Woodcutting, self.config.actions.woodcutting_xp);
                self.log.push("You cut some logs.");
                self.harvest(&tree);
            }
            ActionEffect::Mine { ore } => {
                self.add_item(&ore, 1);
                self.grant(Skill::Mining, self.config.actions.mining_xp);
                let name = self
                    .world
                    .items()
                    .get(&ore)
                    .map_or_else(|| ore.to_string(), |t| t.name.to_lowercase());
                self.log.push(format!("You mined some {name}."));
            }
            ActionEffect::Smelt => self.finish_smelt(),
            ActionEffect::Travel { destination } => {
                let name = self
                    .world
                    .location(&destination)
                    .map_or_else(|| destination.to_string(), |l| l.name.clone());
                self.player.set_location(destination);
                self.log.push(format!("You arrived at {name}."));
            }
        }
    }

    fn finish_smelt(&mut self) {
        let copper = ItemId::new(items::COPPER_ORE);
        let tin = ItemId::new(items::TIN_ORE);
        let inventory = &mut self.player.inventory;
        if !inventory.has(&copper, 1) || !inventory.has(&tin, 1) {
            self.log.push("You no longer have the ore to smelt bronze.");
            return;
        }
        if let Err(err) = inventory.remove_item(&copper, 1).and_then(|_| inventory.remove_item(&tin, 1)) {
            warn!(error = %err, "smelting inputs vanished");
            return;
        }
        self.add_item(&ItemId::new(items::BRONZE_BAR), 1);
        self.grant(Skill::Smithing, self.config.actions.smithing_xp);
        self.log.push("You smelted a bronze bar.");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use runequest_types::Position;
    use runequest_world::locations;

    use super::super::test_support::fresh;
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s)
    }

    #[test]
    fn too_far_from_tree_is_logged() {
        let mut engine = fresh(0);
        assert!(!engine.interact(&id("oak_1")));
        assert_eq!(engine.log().latest(), Some("You are too far from the Oak Tree."));
        assert!(engine.active_action().is_none());
    }

    #[test]
    fn diagonal_neighbour_is_in_range() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(6, 6);
        assert!(engine.interact(&id("oak_1")));
        assert_eq!(engine.active_action().map(|a| a.kind), Some(ActionKind::Woodcutting));
    }

    #[test]
    fn mining_copper_takes_four_seconds() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(15, 14);
        assert!(engine.interact(&id("copper_1")));
        engine.advance(3_900);
        assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::COPPER_ORE)), 0);
        engine.advance(100);
        assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::COPPER_ORE)), 1);
        assert_eq!(engine.player().stats.xp_for(Skill::Mining), 35);
        assert_eq!(engine.log().latest(), Some("You mined some copper ore."));
        // Rocks stay visible.
        assert!(!engine.entities().get(&id("copper_1")).unwrap().hidden);
    }

    #[test]
    fn tin_rock_yields_tin() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(13, 15);
        assert!(engine.interact(&id("tin_1")));
        engine.advance(4_000);
        assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::TIN_ORE)), 1);
    }

    #[test]
    fn smelting_requires_both_ores_at_start() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(5, 14);
        engine.add_item(&ItemId::new(items::COPPER_ORE), 1);
        assert!(!engine.smelt());
        assert_eq!(
            engine.log().latest(),
            Some("You need copper and tin ore to smelt bronze.")
        );
    }

    #[test]
    fn smelting_requires_nearby_forge() {
        let mut engine = fresh(0);
        engine.add_item(&ItemId::new(items::COPPER_ORE), 1);
        engine.add_item(&ItemId::new(items::TIN_ORE), 1);
        assert!(!engine.smelt());
    }

    #[test]
    fn smelting_produces_bronze() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(5, 14);
        engine.add_item(&ItemId::new(items::COPPER_ORE), 1);
        engine.add_item(&ItemId::new(items::TIN_ORE), 1);
        assert!(engine.smelt());
        engine.advance(5_000);

        let inv = &engine.player().inventory;
        assert_eq!(inv.quantity(&ItemId::new(items::BRONZE_BAR)), 1);
        assert_eq!(inv.quantity(&ItemId::new(items::COPPER_ORE)), 0);
        assert_eq!(inv.quantity(&ItemId::new(items::TIN_ORE)), 0);
        assert_eq!(engine.player().stats.xp_for(Skill::Smithing), 50);
    }

    #[test]
    fn smelting_fails_cleanly_if_ore_vanishes() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(5, 14);
        engine.add_item(&ItemId::new(items::COPPER_ORE), 1);
        engine.add_item(&ItemId::new(items::TIN_ORE), 1);
        assert!(engine.smelt());
        engine.add_item(&ItemId::new(items::TIN_ORE), -1);
        engine.advance(5_000);

        let inv = &engine.player().inventory;
        assert_eq!(inv.quantity(&ItemId::new(items::BRONZE_BAR)), 0);
        assert_eq!(inv.quantity(&ItemId::new(items::COPPER_ORE)), 1);
        assert_eq!(engine.player().stats.xp_for(Skill::Smithing), 0);
    }

    #[test]
    fn travel_sets_location() {
        let mut engine = fresh(0);
        assert!(engine.travel(&LocationId::new(locations::SWAMP)));
        engine.advance(2_000);
        assert_eq!(engine.player().location.as_str(), locations::SWAMP);
        assert_eq!(engine.log().latest(), Some("You arrived at Lumbridge Swamp."));
    }

    #[test]
    fn travel_to_unknown_location_is_rejected() {
        let mut engine = fresh(0);
        assert!(!engine.travel(&LocationId::new("varrock_square")));
        assert!(engine.active_action().is_none());
    }

    #[test]
    fn cancel_skips_effect() {
        let mut engine = fresh(0);
        assert!(engine.travel(&LocationId::new(locations::FOREST)));
        engine.advance(1_000);
        assert!(engine.cancel_action());
        engine.advance(5_000);
        assert_eq!(engine.player().location.as_str(), locations::COURTYARD);
        assert!(!engine.cancel_action());
    }

    #[test]
    fn bank_interaction_is_informational() {
        let mut engine = fresh(0);
        assert!(engine.interact(&id("bank_1")));
        assert!(engine.active_action().is_none());
    }
}
