//! The mutable player record.
//!
//! [`PlayerState`] bundles the stats, the inventory, the current location
//! tag, and the equipped item. It is created from a [`LoadedPlayer`] at
//! session start, mutated by actions and combat, and turned into a
//! [`PlayerSnapshot`] for the persistence collaborator.
//!
//! Exclusivity with running actions or combat is enforced by the engine;
//! this type only validates the record itself (bounds, quantities, gold).

use chrono::{DateTime, Utc};
use runequest_types::{
    ItemCategory, ItemId, LoadedPlayer, LocationId, PlayerRecord, PlayerSnapshot, PlayerStats,
    Position, Skill,
};
use runequest_world::{ItemCatalog, TileMap};
use tracing::debug;

use crate::error::PlayerError;
use crate::inventory::Inventory;
use crate::skills::{self, ExperienceGain};

/// Outcome of [`PlayerState::toggle_equip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipChange {
    /// The item is now equipped.
    Equipped,
    /// The item was equipped and has been removed.
    Unequipped,
}

/// The player's full mutable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// Hitpoints, experience, gold, and grid position.
    pub stats: PlayerStats,
    /// Item stacks.
    pub inventory: Inventory,
    /// Current named location.
    pub location: LocationId,
    /// Equipped item, if any.
    pub equipped: Option<ItemId>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::from_loaded(&ItemCatalog::default(), LoadedPlayer::default())
    }
}

impl PlayerState {
    /// Build the state from a loaded record.
    ///
    /// Missing skills are filled with zero experience, `hp` is clamped to
    /// `max_hp`, and unknown inventory rows are dropped.
    pub fn from_loaded(catalog: &ItemCatalog, loaded: LoadedPlayer) -> Self {
        let PlayerRecord {
            hp,
            max_hp,
            gold,
            location,
            position,
            mut xp,
        } = loaded.player;
        skills::ensure_all_skills(&mut xp);

        Self {
            stats: PlayerStats {
                hp: hp.min(max_hp),
                max_hp,
                xp,
                gold,
                position,
            },
            inventory: Inventory::from_records(catalog, &loaded.inventory),
            location,
            equipped: None,
        }
    }

    /// Produce a persistence snapshot of the current state.
    pub fn snapshot(&self, username: &str, taken_at_ms: u64, taken_at: DateTime<Utc>) -> PlayerSnapshot {
        PlayerSnapshot {
            username: username.to_owned(),
            player: PlayerRecord {
                hp: self.stats.hp,
                max_hp: self.stats.max_hp,
                gold: self.stats.gold,
                location: self.location.clone(),
                position: self.stats.position,
                xp: self.stats.xp.clone(),
            },
            inventory: self.inventory.to_records(),
            taken_at_ms,
            taken_at,
        }
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Step by `(dx, dy)` on `map`.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::Blocked`] if the destination is off the map or
    /// not walkable. The position is unchanged in that case.
    pub fn move_by(&mut self, map: &TileMap, dx: i32, dy: i32) -> Result<Position, PlayerError> {
        let from = self.stats.position;
        let to = from.offset(dx, dy).ok_or(PlayerError::Blocked { to: from })?;
        if !map.is_walkable(to) {
            return Err(PlayerError::Blocked { to });
        }
        self.stats.position = to;
        debug!(from = %from, to = %to, "player moved");
        Ok(to)
    }

    /// Set the named location tag.
    pub fn set_location(&mut self, location: LocationId) {
        self.location = location;
    }

    // -----------------------------------------------------------------------
    // Experience
    // -----------------------------------------------------------------------

    /// Grant experience and report any level-up.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::ExperienceOverflow`] if the total would
    /// overflow.
    pub fn apply_experience(&mut self, skill: Skill, amount: u64) -> Result<ExperienceGain, PlayerError> {
        skills::add_experience(&mut self.stats.xp, skill, amount)
    }

    /// Current level in `skill`.
    pub fn level(&self, skill: Skill) -> u32 {
        skills::level_of(&self.stats.xp, skill)
    }

    // -----------------------------------------------------------------------
    // Hitpoints
    // -----------------------------------------------------------------------

    /// Apply `amount` damage, flooring hp at zero. Returns the remaining hp.
    pub const fn take_damage(&mut self, amount: u32) -> u32 {
        self.stats.hp = self.stats.hp.saturating_sub(amount);
        self.stats.hp
    }

    /// Heal up to `max_hp`. Returns the hitpoints actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.stats.hp;
        self.stats.hp = before.saturating_add(amount).min(self.stats.max_hp);
        self.stats.hp.saturating_sub(before)
    }

    /// Restore hp to `max_hp`.
    pub const fn restore_hp(&mut self) {
        self.stats.hp = self.stats.max_hp;
    }

    /// Whether hp has reached zero.
    pub const fn is_dead(&self) -> bool {
        self.stats.hp == 0
    }

    // -----------------------------------------------------------------------
    // Gold
    // -----------------------------------------------------------------------

    /// Add gold.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::ArithmeticOverflow`] if the purse would
    /// overflow.
    pub fn add_gold(&mut self, amount: u64) -> Result<u64, PlayerError> {
        self.stats.gold = self
            .stats
            .gold
            .checked_add(amount)
            .ok_or_else(|| PlayerError::ArithmeticOverflow {
                context: String::from("gold overflow in add_gold"),
            })?;
        Ok(self.stats.gold)
    }

    /// Spend gold.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InsufficientGold`] if the purse is too small.
    pub fn spend_gold(&mut self, amount: u64) -> Result<u64, PlayerError> {
        self.stats.gold = self
            .stats
            .gold
            .checked_sub(amount)
            .ok_or(PlayerError::InsufficientGold {
                required: amount,
                available: self.stats.gold,
            })?;
        Ok(self.stats.gold)
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Consume one healing item. Returns the hitpoints restored.
    ///
    /// # Errors
    ///
    /// - [`PlayerError::InsufficientQuantity`] if none is held.
    /// - [`PlayerError::NotUsable`] if the item has no heal effect.
    pub fn use_item(&mut self, id: &ItemId) -> Result<u32, PlayerError> {
        let heal = {
            let stack = self
                .inventory
                .get(id)
                .filter(|stack| stack.quantity > 0)
                .ok_or_else(|| PlayerError::InsufficientQuantity {
                    item: id.clone(),
                    requested: 1,
                    available: 0,
                })?;
            stack.template.heal.ok_or_else(|| PlayerError::NotUsable {
                item: id.clone(),
                verb: "used",
            })?
        };
        self.inventory.remove_item(id, 1)?;
        Ok(self.heal(heal))
    }

    /// Equip a held equipment item, or unequip it if already equipped.
    ///
    /// # Errors
    ///
    /// - [`PlayerError::InsufficientQuantity`] if the item is not held.
    /// - [`PlayerError::NotUsable`] if the item is not equipment.
    pub fn toggle_equip(&mut self, id: &ItemId) -> Result<EquipChange, PlayerError> {
        if self.equipped.as_ref() == Some(id) {
            self.equipped = None;
            return Ok(EquipChange::Unequipped);
        }
        let stack = self
            .inventory
            .get(id)
            .filter(|stack| stack.quantity > 0)
            .ok_or_else(|| PlayerError::InsufficientQuantity {
                item: id.clone(),
                requested: 1,
                available: 0,
            })?;
        if stack.template.category != ItemCategory::Equipment {
            return Err(PlayerError::NotUsable {
                item: id.clone(),
                verb: "equipped",
            });
        }
        self.equipped = Some(id.clone());
        Ok(EquipChange::Equipped)
    }

    /// Flat max-hit bonus of the equipped item, if it is still held.
    pub fn max_hit_bonus(&self) -> u32 {
        self.equipped
            .as_ref()
            .and_then(|id| self.inventory.get(id))
            .filter(|stack| stack.quantity > 0)
            .and_then(|stack| stack.template.max_hit_bonus)
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use runequest_types::{InventoryRecord, Tile};
    use runequest_world::{BRONZE_SWORD_MAX_HIT_BONUS, items};

    use super::*;

    fn fresh() -> (PlayerState, ItemCatalog) {
        let catalog = ItemCatalog::standard();
        (PlayerState::from_loaded(&catalog, LoadedPlayer::default()), catalog)
    }

    #[test]
    fn default_player_is_full_health_at_spawn() {
        let (player, _) = fresh();
        assert_eq!(player.stats.hp, 10);
        assert_eq!(player.stats.position, Position::new(10, 10));
        assert_eq!(player.stats.xp.len(), Skill::ALL.len());
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn loaded_hp_is_clamped() {
        let catalog = ItemCatalog::standard();
        let mut loaded = LoadedPlayer::default();
        loaded.player.hp = 50;
        let player = PlayerState::from_loaded(&catalog, loaded);
        assert_eq!(player.stats.hp, 10);
    }

    #[test]
    fn movement_respects_walls_and_bounds() {
        let (mut player, _) = fresh();
        let map = TileMap::lumbridge();
        assert_eq!(player.move_by(&map, 1, 0).unwrap(), Position::new(11, 10));

        player.stats.position = Position::new(2, 2);
        assert!(matches!(player.move_by(&map, -1, 0), Err(PlayerError::Blocked { .. })));
        assert_eq!(player.stats.position, Position::new(2, 2));

        let tiny = TileMap::new(2, 1, vec![Tile::Grass, Tile::Grass]).unwrap();
        player.stats.position = Position::new(1, 0);
        assert!(player.move_by(&tiny, 1, 0).is_err());
        assert!(player.move_by(&tiny, -1, 0).is_ok());
    }

    #[test]
    fn damage_floors_and_heal_caps() {
        let (mut player, _) = fresh();
        assert_eq!(player.take_damage(25), 0);
        assert!(player.is_dead());
        assert_eq!(player.heal(4), 4);
        assert_eq!(player.heal(100), 6);
        assert_eq!(player.stats.hp, 10);
    }

    #[test]
    fn spending_more_gold_than_held_fails() {
        let (mut player, _) = fresh();
        player.add_gold(30).unwrap();
        assert!(matches!(
            player.spend_gold(50),
            Err(PlayerError::InsufficientGold {
                required: 50,
                available: 30
            })
        ));
        assert_eq!(player.spend_gold(30).unwrap(), 0);
    }

    #[test]
    fn potion_heals_and_is_consumed() {
        let (mut player, catalog) = fresh();
        let potion = ItemId::new(items::HEALING_POTION);
        player.inventory.add_item(&catalog, &potion, 1);
        player.stats.hp = 3;

        assert_eq!(player.use_item(&potion).unwrap(), 5);
        assert_eq!(player.stats.hp, 8);
        assert_eq!(player.inventory.quantity(&potion), 0);
        assert!(player.use_item(&potion).is_err());
    }

    #[test]
    fn items_without_heal_are_not_usable() {
        let (mut player, catalog) = fresh();
        let wood = ItemId::new(items::WOOD);
        player.inventory.add_item(&catalog, &wood, 1);
        assert!(matches!(player.use_item(&wood), Err(PlayerError::NotUsable { .. })));
        assert_eq!(player.inventory.quantity(&wood), 1);
    }

    #[test]
    fn sword_toggles_max_hit_bonus() {
        let (mut player, catalog) = fresh();
        let sword = ItemId::new(items::BRONZE_SWORD);
        assert!(player.toggle_equip(&sword).is_err());

        player.inventory.add_item(&catalog, &sword, 1);
        assert_eq!(player.toggle_equip(&sword).unwrap(), EquipChange::Equipped);
        assert_eq!(player.max_hit_bonus(), BRONZE_SWORD_MAX_HIT_BONUS);
        assert_eq!(player.toggle_equip(&sword).unwrap(), EquipChange::Unequipped);
        assert_eq!(player.max_hit_bonus(), 0);
    }

    #[test]
    fn resources_cannot_be_equipped() {
        let (mut player, catalog) = fresh();
        let ore = ItemId::new(items::COPPER_ORE);
        player.inventory.add_item(&catalog, &ore, 1);
        assert!(matches!(player.toggle_equip(&ore), Err(PlayerError::NotUsable { .. })));
    }

    #[test]
    fn snapshot_carries_full_inventory() {
        let (mut player, catalog) = fresh();
        player.inventory.add_item(&catalog, &ItemId::new(items::WOOD), 2);
        player.inventory.add_item(&catalog, &ItemId::new(items::SHRIMP), 0);
        player.apply_experience(Skill::Woodcutting, 50).unwrap();

        let snapshot = player.snapshot("zezima", 30_000, Utc::now());
        assert_eq!(snapshot.username, "zezima");
        assert_eq!(snapshot.player.xp.get(&Skill::Woodcutting), Some(&50));
        assert_eq!(
            snapshot.inventory,
            vec![
                InventoryRecord {
                    item_id: ItemId::new(items::SHRIMP),
                    quantity: 0
                },
                InventoryRecord {
                    item_id: ItemId::new(items::WOOD),
                    quantity: 2
                },
            ]
        );

        let restored = PlayerState::from_loaded(&catalog, snapshot.into_loaded());
        assert_eq!(restored.stats, player.stats);
    }
}
