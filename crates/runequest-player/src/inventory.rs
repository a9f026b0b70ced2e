//! Inventory stacks for the player.
//!
//! One [`InventoryItem`] per item id, each carrying a copy of its catalog
//! template so display metadata and effect attributes travel with the
//! stack. Stacks are never deleted when they reach zero; display code filters
//! them through [`Inventory::visible`].
//!
//! Two removal paths exist:
//!
//! - [`Inventory::add_item`] with a negative delta clamps at zero and never
//!   fails.
//! - [`Inventory::remove_item`] is the checked variant for recipes. It fails
//!   with [`PlayerError::InsufficientQuantity`] and mutates nothing when the
//!   stack is too small.

use std::collections::BTreeMap;

use runequest_types::{InventoryItem, InventoryRecord, ItemId};
use runequest_world::ItemCatalog;
use tracing::{debug, warn};

use crate::error::PlayerError;

/// The player's item stacks keyed by item id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Stacks in item id order, zero-quantity entries included.
    items: BTreeMap<ItemId, InventoryItem>,
}

impl Inventory {
    /// An empty inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Rebuild an inventory from persisted rows.
    ///
    /// Rows whose item id is not in the catalog are dropped with a warning.
    /// Duplicate rows for the same id are merged.
    pub fn from_records(catalog: &ItemCatalog, records: &[InventoryRecord]) -> Self {
        let mut inventory = Self::new();
        for record in records {
            if !catalog.contains(&record.item_id) {
                warn!(item = %record.item_id, "dropping unknown item from saved inventory");
                continue;
            }
            inventory.add_item(catalog, &record.item_id, i64::from(record.quantity));
        }
        inventory
    }

    /// Adjust the stack for `id` by `delta`.
    ///
    /// Unknown ids are ignored and return `None`. Otherwise the stack is
    /// created if missing, the quantity is clamped to `0..=u32::MAX`, and the
    /// new quantity is returned.
    pub fn add_item(&mut self, catalog: &ItemCatalog, id: &ItemId, delta: i64) -> Option<u32> {
        let Some(template) = catalog.get(id) else {
            debug!(item = %id, delta, "ignoring unknown item");
            return None;
        };

        let entry = self.items.entry(id.clone()).or_insert_with(|| InventoryItem {
            template: template.clone(),
            quantity: 0,
        });
        let updated = i64::from(entry.quantity).saturating_add(delta);
        entry.quantity = u32::try_from(updated.max(0)).unwrap_or(u32::MAX);
        Some(entry.quantity)
    }

    /// Remove exactly `amount` of `id`.
    ///
    /// Returns the remaining quantity. The stack is kept even when it drops
    /// to zero.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InsufficientQuantity`] if fewer than `amount`
    /// are held. Nothing is mutated in that case.
    pub fn remove_item(&mut self, id: &ItemId, amount: u32) -> Result<u32, PlayerError> {
        let available = self.quantity(id);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| PlayerError::InsufficientQuantity {
                item: id.clone(),
                requested: amount,
                available,
            })?;
        if let Some(entry) = self.items.get_mut(id) {
            entry.quantity = remaining;
        }
        Ok(remaining)
    }

    /// Quantity held of `id` (0 when absent).
    pub fn quantity(&self, id: &ItemId) -> u32 {
        self.items.get(id).map_or(0, |entry| entry.quantity)
    }

    /// Whether at least `amount` of `id` is held.
    pub fn has(&self, id: &ItemId, amount: u32) -> bool {
        self.quantity(id) >= amount
    }

    /// The stack for `id`, if one has ever been created.
    pub fn get(&self, id: &ItemId) -> Option<&InventoryItem> {
        self.items.get(id)
    }

    /// Every stack, zero-quantity entries included.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    /// Stacks with a positive quantity.
    pub fn visible(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values().filter(|entry| entry.quantity > 0)
    }

    /// Number of stacks, zero-quantity entries included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no stack has ever been created.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Persistence rows for every stack.
    pub fn to_records(&self) -> Vec<InventoryRecord> {
        self.items
            .values()
            .map(|entry| InventoryRecord {
                item_id: entry.template.id.clone(),
                quantity: entry.quantity,
            })
            .collect()
    }
}
