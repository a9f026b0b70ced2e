//! Static item templates.
//!
//! Every inventory stack refers to an [`ItemTemplate`] in the catalog. Items
//! whose id is not in the catalog cannot be added to an inventory.

use std::collections::BTreeMap;

use runequest_types::{ItemCategory, ItemId, ItemTemplate};

use crate::error::WorldError;

/// Item identifiers used by the engine's built-in actions.
pub mod items {
    /// Logs from woodcutting.
    pub const WOOD: &str = "wood";
    /// Ore from copper rocks.
    pub const COPPER_ORE: &str = "copper_ore";
    /// Ore from tin rocks.
    pub const TIN_ORE: &str = "tin_ore";
    /// Smelted from one copper and one tin ore.
    pub const BRONZE_BAR: &str = "bronze_bar";
    /// Starter weapon with the flat max-hit bonus.
    pub const BRONZE_SWORD: &str = "bronze_sword";
    /// Mining tool.
    pub const BRONZE_PICKAXE: &str = "bronze_pickaxe";
    /// Woodcutting tool.
    pub const BRONZE_AXE: &str = "bronze_axe";
    /// Combat loot.
    pub const SHRIMP: &str = "shrimp";
    /// Cooked food.
    pub const COOKED_SHRIMP: &str = "cooked_shrimp";
    /// Baked food.
    pub const BREAD: &str = "bread";
    /// Heals five hitpoints; sold at the bank.
    pub const HEALING_POTION: &str = "healing_potion";
}

/// Flat max-hit bonus granted by the bronze sword.
pub const BRONZE_SWORD_MAX_HIT_BONUS: u32 = 3;

/// Shop price of a healing potion.
pub const HEALING_POTION_PRICE: u64 = 50;

/// Lookup table of item templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    /// Templates keyed by id.
    items: BTreeMap<ItemId, ItemTemplate>,
}

impl ItemCatalog {
    /// Build a catalog from templates.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateItem`] if two templates share an id.
    pub fn new(templates: impl IntoIterator<Item = ItemTemplate>) -> Result<Self, WorldError> {
        let mut items = BTreeMap::new();
        for template in templates {
            let id = template.id.clone();
            if items.insert(id.clone(), template).is_some() {
                return Err(WorldError::DuplicateItem(id));
            }
        }
        Ok(Self { items })
    }

    /// The standard Lumbridge item set.
    pub fn standard() -> Self {
        let entries = [
            plain(items::WOOD, "Logs", "🌲", ItemCategory::Resource),
            plain(items::COPPER_ORE, "Copper Ore", "🪨", ItemCategory::Resource),
            plain(items::TIN_ORE, "Tin Ore", "🪨", ItemCategory::Resource),
            plain(items::BRONZE_BAR, "Bronze Bar", "🧱", ItemCategory::Resource),
            ItemTemplate {
                attack_bonus: Some(5),
                strength_bonus: Some(4),
                max_hit_bonus: Some(BRONZE_SWORD_MAX_HIT_BONUS),
                speed_ms: Some(2400),
                ..plain(items::BRONZE_SWORD, "Bronze Sword", "⚔️", ItemCategory::Equipment)
            },
            tool(items::BRONZE_PICKAXE, "Bronze Pickaxe", "⛏️"),
            tool(items::BRONZE_AXE, "Bronze Axe", "🪓"),
            plain(items::SHRIMP, "Raw Shrimp", "🦐", ItemCategory::Consumable),
            plain(items::COOKED_SHRIMP, "Cooked Shrimp", "🍤", ItemCategory::Consumable),
            plain(items::BREAD, "Bread", "🍞", ItemCategory::Consumable),
            ItemTemplate {
                heal: Some(5),
                price: Some(HEALING_POTION_PRICE),
                ..plain(items::HEALING_POTION, "Healing Potion", "🧪", ItemCategory::Consumable)
            },
        ];
        Self {
            items: entries.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Look up a template.
    pub fn get(&self, id: &ItemId) -> Option<&ItemTemplate> {
        self.items.get(id)
    }

    /// Whether the catalog knows this id.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all templates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.items.values()
    }
}

/// A template with no effect attributes.
fn plain(id: &str, name: &str, icon: &str, category: ItemCategory) -> ItemTemplate {
    ItemTemplate {
        id: ItemId::new(id),
        name: name.to_owned(),
        icon: icon.to_owned(),
        category,
        heal: None,
        attack_bonus: None,
        strength_bonus: None,
        defence_bonus: None,
        max_hit_bonus: None,
        speed_ms: None,
        price: None,
    }
}

/// A gathering tool: +1 attack and strength, 3 000 ms speed.
fn tool(id: &str, name: &str, icon: &str) -> ItemTemplate {
    ItemTemplate {
        attack_bonus: Some(1),
        strength_bonus: Some(1),
        speed_ms: Some(3000),
        ..plain(id, name, icon, ItemCategory::Equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_eleven_items() {
        assert_eq!(ItemCatalog::standard().len(), 11);
    }

    #[test]
    fn only_the_sword_grants_a_flat_bonus() {
        let catalog = ItemCatalog::standard();
        let bonused: Vec<&str> = catalog
            .iter()
            .filter(|t| t.max_hit_bonus.is_some())
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(bonused, vec![items::BRONZE_SWORD]);
    }

    #[test]
    fn potion_heals_and_is_for_sale() {
        let catalog = ItemCatalog::standard();
        let potion = catalog.get(&ItemId::new(items::HEALING_POTION));
        assert_eq!(potion.and_then(|p| p.heal), Some(5));
        assert_eq!(potion.and_then(|p| p.price), Some(50));
    }

    #[test]
    fn duplicate_items_are_rejected() {
        let a = plain("wood", "Logs", "", ItemCategory::Resource);
        let result = ItemCatalog::new(vec![a.clone(), a]);
        assert!(matches!(result, Err(WorldError::DuplicateItem(_))));
    }
}
