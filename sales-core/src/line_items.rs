//! The ordered set of lines on a draft invoice.

use std::collections::HashSet;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LineId, LineItem, Product, ProductRef};

/// Largest quantity a single line can hold. Larger requests are capped.
pub const MAX_LINE_QUANTITY: u32 = 1_000_000;

/// Outcome of [`LineItemStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    Updated,
    /// The requested quantity was zero or below, so the line was removed.
    Removed,
    NotFound,
}

/// A restored store listed the same line id twice.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("duplicate line id {0}")]
pub struct DuplicateLineId(pub LineId);

/// Line items in insertion order.
///
/// Adding the same product twice produces two separate lines; lines are
/// never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredLineItems")]
pub struct LineItemStore {
    items: Vec<LineItem>,
    last_id: u64,
}

/// Serialized form, checked before it becomes a [`LineItemStore`].
#[derive(Deserialize)]
struct StoredLineItems {
    items: Vec<LineItem>,
    #[serde(default)]
    last_id: u64,
}

impl TryFrom<StoredLineItems> for LineItemStore {
    type Error = DuplicateLineId;

    /// The id counter resumes after the highest id present, whatever
    /// `last_id` says.
    fn try_from(stored: StoredLineItems) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(stored.items.len());
        for item in &stored.items {
            if !seen.insert(item.id()) {
                return Err(DuplicateLineId(item.id()));
            }
        }
        let highest = stored.items.iter().map(|item| item.id().get()).max().unwrap_or(0);

        Ok(Self {
            items: stored.items,
            last_id: stored.last_id.max(highest),
        })
    }
}

fn capped(quantity: NonZeroU32) -> NonZeroU32 {
    NonZeroU32::new(quantity.get().min(MAX_LINE_QUANTITY)).unwrap_or(NonZeroU32::MIN)
}

impl LineItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line for `product`, pricing it at the product's current price.
    /// Quantities above [`MAX_LINE_QUANTITY`] are capped.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: NonZeroU32,
    ) -> LineId {
        self.last_id += 1;
        let id = LineId::new(self.last_id);
        self.items.push(LineItem::new(
            id,
            ProductRef::from(product),
            capped(quantity),
            product.price,
        ));
        id
    }

    pub fn add_one(
        &mut self,
        product: &Product,
    ) -> LineId {
        self.add(product, NonZeroU32::MIN)
    }

    /// Sets the quantity of a line. Zero or below removes the line;
    /// values above [`MAX_LINE_QUANTITY`] are capped.
    pub fn update_quantity(
        &mut self,
        id: LineId,
        new_quantity: i64,
    ) -> QuantityUpdate {
        if new_quantity <= 0 {
            return match self.remove(id) {
                Some(_) => QuantityUpdate::Removed,
                None => QuantityUpdate::NotFound,
            };
        }

        let quantity = u32::try_from(new_quantity.min(i64::from(MAX_LINE_QUANTITY)))
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN);

        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.set_quantity(quantity);
                QuantityUpdate::Updated
            }
            None => QuantityUpdate::NotFound,
        }
    }

    /// Removes a line, returning it. Removing an absent line is a no-op.
    pub fn remove(
        &mut self,
        id: LineId,
    ) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Drops every line. Ids already handed out are not reused.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(
        &self,
        id: LineId,
    ) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

impl<'a> IntoIterator for &'a LineItemStore {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn product(
        id: i64,
        price: Decimal,
    ) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            sku: format!("SKU-{id:03}"),
            category: "Electronics".to_string(),
            quantity: 25,
            low_stock_threshold: 10,
            price,
            cost: price,
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn expected_subtotal(store: &LineItemStore) -> Decimal {
        store
            .iter()
            .map(|item| Decimal::from(item.quantity()) * item.unit_price())
            .sum()
    }

    // =========================================================================
    // add tests
    // =========================================================================

    #[test]
    fn add_appends_in_insertion_order() {
        let mut store = LineItemStore::new();
        let laptop = store.add_one(&product(1, dec!(85000)));
        let chair = store.add_one(&product(2, dec!(15000)));

        let ids: Vec<_> = store.iter().map(LineItem::id).collect();
        assert_eq!(ids, vec![laptop, chair]);
    }

    #[test]
    fn add_captures_price_and_computes_line_total() {
        let mut store = LineItemStore::new();
        let id = store.add(&product(1, dec!(85000)), qty(2));

        let item = store.get(id).unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.unit_price(), dec!(85000));
        assert_eq!(item.line_total(), dec!(170000));
        assert_eq!(item.product().sku, "SKU-001");
    }

    #[test]
    fn add_same_product_twice_creates_two_lines() {
        let mut store = LineItemStore::new();
        let mouse = product(3, dec!(2500));

        let first = store.add_one(&mouse);
        let second = store.add_one(&mouse);

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.subtotal(), dec!(5000));
    }

    #[test]
    fn later_catalog_price_change_does_not_affect_line() {
        let mut store = LineItemStore::new();
        let mut chair = product(2, dec!(15000));
        let id = store.add_one(&chair);

        chair.price = dec!(18000);

        assert_eq!(store.get(id).unwrap().unit_price(), dec!(15000));
    }

    // =========================================================================
    // update_quantity tests
    // =========================================================================

    #[test]
    fn update_quantity_recomputes_line_total() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(1, dec!(85000)));

        assert_eq!(store.update_quantity(id, 3), QuantityUpdate::Updated);
        assert_eq!(store.get(id).unwrap().line_total(), dec!(255000));
    }

    #[test]
    fn update_quantity_to_zero_removes_line() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(1, dec!(85000)));

        assert_eq!(store.update_quantity(id, 0), QuantityUpdate::Removed);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn update_quantity_negative_removes_line() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(1, dec!(85000)));

        assert_eq!(store.update_quantity(id, -4), QuantityUpdate::Removed);
        assert!(store.is_empty());
    }

    #[test]
    fn update_quantity_unknown_line_is_noop() {
        let mut store = LineItemStore::new();
        store.add_one(&product(1, dec!(85000)));
        let before = store.clone();

        assert_eq!(store.update_quantity(LineId::new(99), 5), QuantityUpdate::NotFound);
        assert_eq!(store.update_quantity(LineId::new(99), 0), QuantityUpdate::NotFound);
        assert_eq!(store, before);
    }

    #[test]
    fn update_quantity_caps_huge_values() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(1, dec!(1)));

        store.update_quantity(id, i64::MAX);

        assert_eq!(store.get(id).unwrap().quantity(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn add_caps_huge_quantity() {
        let mut store = LineItemStore::new();

        let id = store.add(&product(1, dec!(1)), NonZeroU32::MAX);

        assert_eq!(store.get(id).unwrap().quantity(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn extreme_price_and_quantity_do_not_panic() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(1, dec!(100000000000000000000)));
        store.update_quantity(id, i64::MAX);
        store.add(&product(2, Decimal::MAX), qty(5));

        assert_eq!(store.get(id).unwrap().line_total(), dec!(100000000000000000000000000));
        assert_eq!(store.subtotal(), Decimal::MAX);
    }

    #[test]
    fn update_to_zero_is_equivalent_to_remove() {
        let mut via_update = LineItemStore::new();
        let keep = via_update.add_one(&product(1, dec!(85000)));
        let chair = via_update.add(&product(2, dec!(15000)), qty(4));
        let mut via_remove = via_update.clone();

        via_update.update_quantity(chair, 0);
        via_remove.remove(chair);

        assert_eq!(via_update, via_remove);
        assert_eq!(via_update.get(keep).unwrap().line_total(), dec!(85000));
    }

    // =========================================================================
    // remove tests
    // =========================================================================

    #[test]
    fn remove_returns_removed_line() {
        let mut store = LineItemStore::new();
        let id = store.add_one(&product(2, dec!(15000)));

        let removed = store.remove(id).unwrap();

        assert_eq!(removed.id(), id);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_twice_is_idempotent() {
        let mut store = LineItemStore::new();
        let keep = store.add_one(&product(1, dec!(85000)));
        let id = store.add_one(&product(2, dec!(15000)));

        store.remove(id);
        let after_first = store.clone();
        let second = store.remove(id);

        assert!(second.is_none());
        assert_eq!(store, after_first);
        assert!(store.get(keep).is_some());
    }

    #[test]
    fn ids_are_not_reused_after_remove_or_clear() {
        let mut store = LineItemStore::new();
        let first = store.add_one(&product(1, dec!(1)));
        store.remove(first);
        store.clear();

        let second = store.add_one(&product(1, dec!(1)));

        assert!(second > first);
    }

    // =========================================================================
    // serde tests
    // =========================================================================

    #[test]
    fn restored_store_resumes_ids_after_highest_line() {
        let mut store = LineItemStore::new();
        let first = store.add_one(&product(1, dec!(85000)));
        let second = store.add_one(&product(2, dec!(15000)));
        let mut json = serde_json::to_value(&store).unwrap();
        json["last_id"] = serde_json::json!(0);

        let mut restored: LineItemStore = serde_json::from_value(json).unwrap();
        let third = restored.add_one(&product(3, dec!(2500)));

        assert_ne!(third, first);
        assert_ne!(third, second);
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn restored_store_rejects_duplicate_ids() {
        let mut store = LineItemStore::new();
        store.add_one(&product(1, dec!(85000)));
        let mut json = serde_json::to_value(&store).unwrap();
        let line = json["items"][0].clone();
        json["items"].as_array_mut().unwrap().push(line);

        let result = serde_json::from_value::<LineItemStore>(json);

        assert!(result.unwrap_err().to_string().contains("duplicate line id #1"));
    }

    // =========================================================================
    // subtotal invariant
    // =========================================================================

    #[test]
    fn subtotal_tracks_every_mutation() {
        let mut store = LineItemStore::new();
        assert_eq!(store.subtotal(), dec!(0));

        let laptop = store.add(&product(1, dec!(85000)), qty(2));
        let chair = store.add_one(&product(2, dec!(15000)));
        let mouse = store.add(&product(3, dec!(2500)), qty(3));
        assert_eq!(store.subtotal(), expected_subtotal(&store));
        assert_eq!(store.subtotal(), dec!(192500));

        store.update_quantity(laptop, 1);
        assert_eq!(store.subtotal(), expected_subtotal(&store));

        store.remove(chair);
        assert_eq!(store.subtotal(), expected_subtotal(&store));

        store.update_quantity(mouse, 0);
        assert_eq!(store.subtotal(), expected_subtotal(&store));
        assert_eq!(store.subtotal(), dec!(85000));
    }
}
