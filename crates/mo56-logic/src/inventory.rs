//! Item counts by id.
//!
//! Crafting only needs to count, add, and remove stacks of items, so the
//! [`ItemStore`] trait is that small surface. [`ItemBag`] is the plain
//! implementation used by the engine and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Count-based item storage.
pub trait ItemStore {
    /// How many of `item_id` are held.
    fn count(&self, item_id: &str) -> u32;
    /// Add `quantity` of `item_id`.
    fn add(&mut self, item_id: &str, quantity: u32);
    /// Remove up to `quantity` of `item_id`; returns how many were removed.
    fn remove(&mut self, item_id: &str, quantity: u32) -> u32;

    fn has(&self, item_id: &str, quantity: u32) -> bool {
        self.count(item_id) >= quantity
    }
}

/// Item stacks keyed by id. Empty stacks are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBag {
    items: BTreeMap<String, u32>,
}

impl ItemBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add, for setting up starting kits.
    pub fn with(mut self, item_id: &str, quantity: u32) -> Self {
        self.add(item_id, quantity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct item ids held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.values().map(|q| u64::from(*q)).sum()
    }
}

impl ItemStore for ItemBag {
    fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    fn add(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 || item_id.is_empty() {
            return;
        }
        let stack = self.items.entry(item_id.to_string()).or_insert(0);
        *stack = stack.saturating_add(quantity);
    }

    fn remove(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(stack) = self.items.get_mut(item_id) else {
            return 0;
        };
        let removed = quantity.min(*stack);
        *stack -= removed;
        if *stack == 0 {
            self.items.remove(item_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_count() {
        let mut bag = ItemBag::new();
        bag.add("Fiber", 3);
        bag.add("Fiber", 2);
        bag.add("Stone", 0);
        assert_eq!(bag.count("Fiber"), 5);
        assert_eq!(bag.count("Stone"), 0);
        assert_eq!(bag.len(), 1);
        assert!(bag.has("Fiber", 5));
        assert!(!bag.has("Fiber", 6));
    }

    #[test]
    fn remove_is_bounded_by_stock() {
        let mut bag = ItemBag::new().with("Flint", 2);
        assert_eq!(bag.remove("Flint", 5), 2);
        assert_eq!(bag.count("Flint"), 0);
        assert!(bag.is_empty());
        assert_eq!(bag.remove("Flint", 1), 0);
        assert_eq!(bag.remove("Missing", 1), 0);
    }

    #[test]
    fn stacks_saturate() {
        let mut bag = ItemBag::new().with("Pebble", u32::MAX);
        bag.add("Pebble", 10);
        assert_eq!(bag.count("Pebble"), u32::MAX);
    }

    #[test]
    fn iteration_is_sorted_by_id() {
        let bag = ItemBag::new().with("Stick", 1).with("Bark", 4).with("Fiber", 2);
        let ids: Vec<&str> = bag.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["Bark", "Fiber", "Stick"]);
        assert_eq!(bag.total_quantity(), 7);
    }
}
