//! Authoritative item registry and the toolkit of unplaced items.
//!
//! The registry mirrors the external item source and is replaced wholesale
//! on load. The toolkit is the staging set of items not currently placed on
//! the board; its membership is maintained by the graph store so that every
//! item is in exactly one place at all times.

use crate::types::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// The authoritative, ordered list of placeable items for the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemRegistry {
    items: Vec<Item>,
}

impl ItemRegistry {
    /// Creates a registry from the item source's fetch result.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Replaces the registry contents with a fresh fetch.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Looks up an item by id.
    ///
    /// Returns `None` when the id is unknown; callers must treat absence as
    /// "cannot complete operation" and abort rather than assume.
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// All items in source order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of known items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items are known.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The ordered set of items not yet placed on the board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Toolkit {
    entries: Vec<Item>,
}

impl Toolkit {
    /// Appends items to the toolkit, skipping ids already present.
    pub fn add_items(&mut self, items: Vec<Item>) {
        for item in items {
            if !self.contains(&item.id) {
                self.entries.push(item);
            }
        }
    }

    /// Removes and returns the entry with the given id, if present.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Item> {
        let index = self.entries.iter().position(|item| item.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Removes every entry matching the predicate.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Item) -> bool) {
        self.entries.retain(|item| !predicate(item));
    }

    /// Moves the entry at `from` to position `to`.
    ///
    /// Out-of-range indices leave the toolkit unchanged.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.entries.len() || to >= self.entries.len() || from == to {
            return;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
    }

    /// True if an entry with the given id is staged here.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|item| item.id == id)
    }

    /// The staged entries in display order.
    pub fn entries(&self) -> &[Item] {
        &self.entries
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when every item is placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKind;
    use serde_json::json;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            kind: ItemKind::Instance,
            display_name: id.to_uppercase(),
            status: "running".to_string(),
            provider_metadata: json!({}),
        }
    }

    #[test]
    fn registry_lookup_by_id() {
        let registry = ItemRegistry::new(vec![item("a"), item("b")]);
        assert_eq!(registry.find("b").map(|i| i.id.as_str()), Some("b"));
        assert!(registry.find("z").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_replace_swaps_contents() {
        let mut registry = ItemRegistry::new(vec![item("a")]);
        registry.replace(vec![item("x"), item("y")]);
        assert!(registry.find("a").is_none());
        assert!(registry.find("x").is_some());
    }

    #[test]
    fn toolkit_add_skips_duplicates() {
        let mut toolkit = Toolkit::default();
        toolkit.add_items(vec![item("a"), item("b")]);
        toolkit.add_items(vec![item("b"), item("c")]);
        let ids: Vec<&str> = toolkit.entries().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn toolkit_remove_by_id() {
        let mut toolkit = Toolkit::default();
        toolkit.add_items(vec![item("a"), item("b")]);
        let removed = toolkit.remove_by_id("a");
        assert_eq!(removed.map(|i| i.id), Some("a".to_string()));
        assert!(toolkit.remove_by_id("a").is_none());
        assert_eq!(toolkit.len(), 1);
    }

    #[test]
    fn toolkit_reorder_moves_entry() {
        let mut toolkit = Toolkit::default();
        toolkit.add_items(vec![item("a"), item("b"), item("c")]);
        toolkit.reorder(0, 2);
        let ids: Vec<&str> = toolkit.entries().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn toolkit_reorder_ignores_out_of_range() {
        let mut toolkit = Toolkit::default();
        toolkit.add_items(vec![item("a"), item("b")]);
        toolkit.reorder(0, 5);
        toolkit.reorder(7, 0);
        let ids: Vec<&str> = toolkit.entries().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
