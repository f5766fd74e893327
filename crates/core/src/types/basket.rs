//! Basket entries and quantity arithmetic.
//!
//! The basket keeps one entry per product id. Every entry carries a full
//! snapshot of the product as it was when added, so an entry stays intact
//! when the category it came from is no longer loaded.
//!
//! ```text
//! absent --add--> present(1) --add/increment--> present(n + 1)
//! present(n > 1) --decrement--> present(n - 1)
//! present(1) --decrement--> absent
//! present(n) --remove--> absent
//! ```

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::ProductRecord;

/// A product snapshot with a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    #[serde(flatten)]
    pub product: ProductRecord,
    pub quantity: u32,
}

impl BasketEntry {
    /// Product id of the entry.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Result of a quantity change on an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "quantity", rename_all = "snake_case")]
pub enum QuantityChange {
    /// The entry now has this quantity.
    Updated(u32),
    /// The entry was removed.
    Removed,
    /// No entry with that id exists.
    Missing,
}

/// Ordered basket contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Basket {
    entries: Vec<BasketEntry>,
}

impl Basket {
    /// Create an empty basket.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[BasketEntry] {
        &self.entries
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the basket holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&BasketEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Add one unit of `product`, creating the entry if needed.
    ///
    /// Returns the entry's new quantity.
    pub fn add(&mut self, product: &ProductRecord) -> u32 {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id() == &product.id) {
            entry.quantity = entry.quantity.saturating_add(1);
            return entry.quantity;
        }
        self.entries.push(BasketEntry {
            product: product.clone(),
            quantity: 1,
        });
        1
    }

    /// Add one unit to an existing entry. Never creates an entry.
    pub fn increment(&mut self, id: &ProductId) -> QuantityChange {
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                entry.quantity = entry.quantity.saturating_add(1);
                QuantityChange::Updated(entry.quantity)
            }
            None => QuantityChange::Missing,
        }
    }

    /// Remove one unit; an entry at quantity one is removed entirely.
    pub fn decrement(&mut self, id: &ProductId) -> QuantityChange {
        let Some(index) = self.position(id) else {
            return QuantityChange::Missing;
        };
        let Some(entry) = self.entries.get_mut(index) else {
            return QuantityChange::Missing;
        };
        if entry.quantity > 1 {
            entry.quantity -= 1;
            QuantityChange::Updated(entry.quantity)
        } else {
            self.entries.remove(index);
            QuantityChange::Removed
        }
    }

    /// Remove an entry regardless of quantity. Returns whether one existed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id() != id);
        self.entries.len() != before
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert a restored entry, merging quantities with an existing one.
    ///
    /// Entries with quantity zero are ignored; returns whether anything
    /// changed.
    pub fn restore(&mut self, entry: BasketEntry) -> bool {
        if entry.quantity == 0 {
            return false;
        }
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id() == entry.id()) {
            existing.quantity = existing.quantity.saturating_add(entry.quantity);
        } else {
            self.entries.push(entry);
        }
        true
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |total, e| total.saturating_add(e.quantity))
    }

    /// Sum of all line prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.entries.iter().map(BasketEntry::line_price).sum()
    }
}
