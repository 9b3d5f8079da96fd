// SPDX-License-Identifier: Apache-2.0

use crate::persistence::{CartPersistence, PersistError};
use empaque_model::{ProductId, QuotationItem};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One cart line. The same product in two sizes is two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub selected_size: Option<String>,
    pub quantity: u32,
}

/// Identity of a line for merging and removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub selected_size: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            selected_size: self.selected_size.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&[CartLine]) + Send>;

/// In-memory cart with change notifications.
///
/// Every mutation notifies subscribers with the full line list, so a UI can
/// rerender its badge and line view from one callback.
#[derive(Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    persistence: Option<Box<dyn CartPersistence>>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Loads the saved lines and keeps saving after every mutation. A
    /// failed save is logged and the in-memory cart stays authoritative.
    pub fn with_persistence(
        persistence: Box<dyn CartPersistence>,
    ) -> Result<Self, PersistError> {
        let lines = persistence.load()?;
        Ok(Self {
            lines,
            persistence: Some(persistence),
            ..Self::default()
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Distinct lines in the cart; what the cart badge shows.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Adds a line, merging quantities when the (product, size) pair is
    /// already present. A zero quantity is treated as one.
    pub fn add(&mut self, line: CartLine) {
        let added = line.quantity.max(1);
        let key = line.key();
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(added);
            }
            None => {
                let mut line = line;
                line.quantity = added;
                self.lines.push(line);
            }
        }
        self.notify();
    }

    /// Sets an absolute quantity for a line; zero removes it. Unknown keys
    /// are ignored.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == *key) {
            line.quantity = quantity;
            self.notify();
        }
    }

    pub fn remove(&mut self, key: &LineKey) {
        let before = self.lines.len();
        self.lines.retain(|l| l.key() != *key);
        if self.lines.len() != before {
            self.notify();
        }
    }

    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.notify();
        }
    }

    /// Snapshot as quotation line items, in insertion order.
    #[must_use]
    pub fn quotation_items(&self) -> Vec<QuotationItem> {
        self.lines
            .iter()
            .map(|l| QuotationItem {
                name: l.name.clone(),
                category: l.category.clone(),
                quantity: l.quantity,
                selected_size: l.selected_size.clone(),
            })
            .collect()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[CartLine]) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sid, _)| *sid != id);
    }

    fn notify(&mut self) {
        let snapshot = self.lines.clone();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&snapshot) {
                warn!("cart save failed: {e}");
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .field("listeners", &self.listeners.len())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) fn line(id_suffix: u8, size: Option<&str>, quantity: u32) -> CartLine {
        let hex = format!("{:024x}", u64::from(id_suffix));
        CartLine {
            product_id: ProductId::parse(&hex).unwrap(),
            name: format!("Producto {id_suffix}"),
            category: "Bolsas".to_string(),
            image_url: "https://img.example/p.png".to_string(),
            selected_size: size.map(str::to_string),
            quantity,
        }
    }

    #[test]
    fn same_product_and_size_merges_into_one_line() {
        let mut cart = CartStore::new();
        cart.add(line(1, Some("30x40"), 2));
        cart.add(line(1, Some("30x40"), 3));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn different_sizes_are_different_lines() {
        let mut cart = CartStore::new();
        cart.add(line(1, Some("30x40"), 1));
        cart.add(line(1, Some("40x50"), 1));
        cart.add(line(1, None, 1));
        assert_eq!(cart.line_count(), 3);
    }

    #[test]
    fn zero_quantity_add_counts_as_one() {
        let mut cart = CartStore::new();
        cart.add(line(1, None, 0));
        assert_eq!(cart.unit_count(), 1);
    }

    #[test]
    fn updating_to_zero_removes_the_line() {
        let mut cart = CartStore::new();
        cart.add(line(1, None, 4));
        let key = cart.lines()[0].key();
        cart.update_quantity(&key, 0);
        assert_eq!(cart.line_count(), 0);
    }

    #[test]
    fn update_sets_an_absolute_quantity() {
        let mut cart = CartStore::new();
        cart.add(line(1, None, 4));
        let key = cart.lines()[0].key();
        cart.update_quantity(&key, 9);
        assert_eq!(cart.unit_count(), 9);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cart = CartStore::new();
        let seen = Arc::clone(&calls);
        cart.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        cart.add(line(1, None, 1));
        let key = cart.lines()[0].key();
        cart.update_quantity(&key, 2);
        cart.remove(&key);
        cart.clear();
        // clear on an empty cart does not fire
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cart = CartStore::new();
        let seen = Arc::clone(&calls);
        let id = cart.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        cart.unsubscribe(id);
        cart.add(line(1, None, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn quotation_items_preserve_sizes_and_order() {
        let mut cart = CartStore::new();
        cart.add(line(1, Some("30x40"), 2));
        cart.add(line(2, None, 1));
        let items = cart.quotation_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].selected_size.as_deref(), Some("30x40"));
        assert_eq!(items[1].quantity, 1);
    }

    proptest! {
        #[test]
        fn unit_count_equals_the_sum_of_merged_adds(
            adds in proptest::collection::vec((0u8..4, 0u32..20), 0..40)
        ) {
            let mut cart = CartStore::new();
            let mut expected: u64 = 0;
            for (id, qty) in adds {
                expected += u64::from(qty.max(1));
                cart.add(line(id, None, qty));
            }
            prop_assert_eq!(cart.unit_count(), expected);
            prop_assert!(cart.line_count() <= 4);
        }
    }
}
