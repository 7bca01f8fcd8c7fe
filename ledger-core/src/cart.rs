use std::collections::HashMap;

use crate::error::LedgerResult;
use crate::models::{Item, PurchaseLine};
use crate::money;

/// Pending quantities for the seller currently being purchased from.
///
/// Pure in-memory state; nothing here touches the store. A quantity of zero
/// is never kept in the map, so dropping an item to zero removes it.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    seller_id: Option<String>,
    quantities: HashMap<String, u64>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seller the quantities belong to, if one was selected.
    pub fn seller_id(&self) -> Option<&str> {
        self.seller_id.as_deref()
    }

    /// Scopes the cart to `seller_id`.
    ///
    /// Moving to a different seller empties the cart unless `keep` is set.
    /// Re-selecting the current seller leaves quantities alone.
    pub fn switch_seller(&mut self, seller_id: &str, keep: bool) {
        if self.seller_id.as_deref() != Some(seller_id) && !keep {
            self.quantities.clear();
        }
        self.seller_id = Some(seller_id.to_string());
    }

    /// Drops the seller scope and every pending quantity.
    pub fn reset(&mut self) {
        self.seller_id = None;
        self.quantities.clear();
    }

    /// Empties the quantities but keeps the seller scope.
    pub fn clear(&mut self) {
        self.quantities.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    pub fn qty(&self, item_id: &str) -> u64 {
        self.quantities.get(item_id).copied().unwrap_or(0)
    }

    /// Pending quantities, in no particular order.
    pub fn quantities(&self) -> impl Iterator<Item = (&str, u64)> {
        self.quantities.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// Adds `delta` to the current quantity, flooring at zero.
    pub fn change_qty(&mut self, item_id: &str, delta: i64) -> u64 {
        let current = i64::try_from(self.qty(item_id)).unwrap_or(i64::MAX);
        let next = current.saturating_add(delta).max(0) as u64;
        self.store_qty(item_id, next)
    }

    /// Sets the quantity from raw user input.
    ///
    /// Anything that does not parse as an integer counts as zero, and
    /// negative values are floored to zero.
    pub fn set_qty(&mut self, item_id: &str, raw: &str) -> u64 {
        let next = raw.trim().parse::<i64>().unwrap_or(0).max(0) as u64;
        self.store_qty(item_id, next)
    }

    fn store_qty(&mut self, item_id: &str, qty: u64) -> u64 {
        if qty == 0 {
            self.quantities.remove(item_id);
        } else {
            self.quantities.insert(item_id.to_string(), qty);
        }
        qty
    }

    /// Sum of `qty * price` using the seller's current catalog prices.
    ///
    /// Entries whose item has since been removed from the catalog add nothing.
    /// Fails with a validation error when the total does not fit in a `u64`.
    pub fn compute_total(&self, items: &[Item]) -> LedgerResult<u64> {
        let mut total = 0;
        for (item_id, qty) in &self.quantities {
            if let Some(item) = items.iter().find(|item| &item.item_id == item_id) {
                total = money::add(total, money::line_amount(*qty, item.price)?)?;
            }
        }
        Ok(total)
    }

    /// Builds purchase lines for every positive quantity, in catalog order.
    ///
    /// An empty result means there is nothing to save.
    pub fn to_purchase_lines(&self, items: &[Item]) -> Vec<PurchaseLine> {
        items
            .iter()
            .filter_map(|item| {
                let qty = self.qty(&item.item_id);
                (qty > 0).then(|| PurchaseLine {
                    item_id: item.item_id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    qty,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: u64) -> Item {
        Item {
            item_id: id.to_string(),
            name: id.to_uppercase(),
            price,
            code: String::new(),
            photo: String::new(),
        }
    }

    #[test]
    fn change_qty_floors_at_zero() {
        let mut cart = Cart::new();
        assert_eq!(cart.change_qty("milk", 2), 2);
        assert_eq!(cart.change_qty("milk", -5), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn set_qty_parses_or_falls_back_to_zero() {
        let mut cart = Cart::new();
        assert_eq!(cart.set_qty("milk", " 4 "), 4);
        assert_eq!(cart.set_qty("bread", "abc"), 0);
        assert_eq!(cart.set_qty("eggs", "-3"), 0);
        assert_eq!(cart.set_qty("milk", "2.5"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn total_ignores_items_missing_from_catalog() {
        let items = vec![item("milk", 56), item("bread", 40)];
        let mut cart = Cart::new();
        cart.change_qty("milk", 2);
        cart.change_qty("bread", 1);
        cart.change_qty("ghost", 9);

        assert_eq!(cart.compute_total(&items).unwrap(), 152);
    }

    #[test]
    fn total_does_not_depend_on_entry_order() {
        let items = vec![item("a", 3), item("b", 5), item("c", 7)];
        let mut forward = Cart::new();
        let mut backward = Cart::new();
        for (id, qty) in [("a", 1), ("b", 2), ("c", 3)] {
            forward.change_qty(id, qty);
        }
        for (id, qty) in [("c", 3), ("b", 2), ("a", 1)] {
            backward.change_qty(id, qty);
        }

        assert_eq!(forward.compute_total(&items).unwrap(), 34);
        assert_eq!(
            forward.compute_total(&items).unwrap(),
            backward.compute_total(&items).unwrap()
        );
    }

    #[test]
    fn zero_qty_removes_contribution() {
        let items = vec![item("a", 3), item("b", 5)];
        let mut cart = Cart::new();
        cart.change_qty("a", 2);
        cart.change_qty("b", 1);
        cart.set_qty("b", "0");

        assert_eq!(cart.compute_total(&items).unwrap(), 6);
        assert_eq!(cart.to_purchase_lines(&items).len(), 1);
    }

    #[test]
    fn huge_quantity_is_rejected_instead_of_wrapping() {
        let items = vec![item("a", 3)];
        let mut cart = Cart::new();
        assert_eq!(cart.change_qty("a", i64::MAX), i64::MAX as u64);
        assert_eq!(cart.change_qty("a", i64::MAX), i64::MAX as u64);

        let err = cart.compute_total(&items).unwrap_err();
        assert!(matches!(err, crate::LedgerError::Validation(_)));
        assert_eq!(err.to_string(), "amount too large");
    }

    #[test]
    fn purchase_lines_follow_catalog_order_and_snapshot_prices() {
        let items = vec![item("a", 3), item("b", 5)];
        let mut cart = Cart::new();
        cart.change_qty("b", 4);
        cart.change_qty("a", 1);

        let lines = cart.to_purchase_lines(&items);
        assert_eq!(lines[0].item_id, "a");
        assert_eq!(lines[1].item_id, "b");
        assert_eq!(lines[1].name, "B");
        assert_eq!(lines[1].price, 5);
        assert_eq!(lines[1].qty, 4);
    }

    #[test]
    fn empty_cart_produces_no_lines() {
        let cart = Cart::new();
        assert!(cart.to_purchase_lines(&[item("a", 3)]).is_empty());
    }

    #[test]
    fn switching_seller_resets_unless_kept() {
        let mut cart = Cart::new();
        cart.switch_seller("s1", false);
        cart.change_qty("a", 1);

        cart.switch_seller("s1", false);
        assert_eq!(cart.qty("a"), 1);

        cart.switch_seller("s2", true);
        assert_eq!(cart.qty("a"), 1);
        assert_eq!(cart.seller_id(), Some("s2"));

        cart.switch_seller("s3", false);
        assert!(cart.is_empty());
    }
}
