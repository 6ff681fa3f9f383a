//! Per-customer edit overlay.
//!
//! Saved edits sit on top of the orders parsed from the sheet; the parsed
//! originals are never touched. [`OrderDraft`] models one in-progress edit
//! and is turned into an overlay entry on commit.

use crate::constants::PRICE_CHANGE_EPSILON;
use crate::models::{CustomerEdit, OrderItem};
use chrono::Local;
use std::collections::HashMap;
use tracing::debug;

/// Saved edits keyed by customer name
#[derive(Debug, Clone, Default)]
pub struct EditOverlay {
    entries: HashMap<String, CustomerEdit>,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, customer: &str) -> Option<&CustomerEdit> {
        self.entries.get(customer)
    }

    /// Custom prices of one customer, if any edit was saved
    pub fn custom_prices(&self, customer: &str) -> Option<&HashMap<String, f64>> {
        self.entries.get(customer).map(|edit| &edit.custom_prices)
    }

    /// Replace a customer's entry as a whole and stamp it with the current time
    pub fn save(
        &mut self,
        customer: &str,
        items: Vec<OrderItem>,
        custom_prices: HashMap<String, f64>,
    ) -> &CustomerEdit {
        debug!(
            "Saving overlay for '{}': {} items, {} custom prices",
            customer,
            items.len(),
            custom_prices.len()
        );
        let edit = CustomerEdit {
            items,
            custom_prices,
            last_modified: Local::now(),
        };
        self.entries.insert(customer.to_string(), edit);
        &self.entries[customer]
    }

    pub fn contains(&self, customer: &str) -> bool {
        self.entries.contains_key(customer)
    }

    /// Number of customers with saved edits
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DraftLine {
    item: OrderItem,
    /// Price the line had when the draft was opened
    current_price: f64,
    removed: bool,
}

/// An in-progress edit of one customer's order.
///
/// Quantity and price changes apply to the lines present when the draft was
/// opened; [`add_item`](Self::add_item) merges into an existing line of the
/// same name. Nothing is saved until the draft is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    customer: String,
    lines: Vec<DraftLine>,
    added: Vec<OrderItem>,
    custom_prices: HashMap<String, f64>,
    price_updates: HashMap<String, f64>,
}

impl OrderDraft {
    /// Open a draft from the current items, each paired with its current unit price
    pub fn new(
        customer: impl Into<String>,
        lines: Vec<(OrderItem, f64)>,
        custom_prices: HashMap<String, f64>,
    ) -> Self {
        Self {
            customer: customer.into(),
            lines: lines
                .into_iter()
                .map(|(item, current_price)| DraftLine {
                    item,
                    current_price,
                    removed: false,
                })
                .collect(),
            added: Vec::new(),
            custom_prices,
            price_updates: HashMap::new(),
        }
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    /// Set the quantity of the line at `index`; 0 drops the line on finish
    pub fn set_quantity(&mut self, index: usize, qty: u32) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.item.qty = qty;
                true
            }
            None => false,
        }
    }

    /// Mark the line at `index` for deletion
    pub fn remove(&mut self, index: usize) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.removed = true;
                true
            }
            None => false,
        }
    }

    /// Set a custom unit price for an existing line.
    ///
    /// The price is recorded only when it differs from the line's current
    /// price by more than [`PRICE_CHANGE_EPSILON`]. Returns whether it was recorded.
    pub fn set_price(&mut self, item: &str, price: f64) -> bool {
        let Some(line) = self.lines.iter().find(|line| line.item.name == item) else {
            return false;
        };
        if (price - line.current_price).abs() > PRICE_CHANGE_EPSILON {
            self.price_updates.insert(item.to_string(), price);
            true
        } else {
            self.price_updates.remove(item);
            false
        }
    }

    /// Add a catalog item, summing quantities with a line of the same name
    pub fn add_item(&mut self, name: impl Into<String>, qty: u32) {
        let name = name.into();
        if name.is_empty() || qty == 0 {
            return;
        }
        self.added.push(OrderItem::new(name, qty));
    }

    /// Custom prices recorded in this draft (not including earlier saved ones)
    pub fn price_updates(&self) -> &HashMap<String, f64> {
        &self.price_updates
    }

    /// Saved custom prices merged with this draft's price updates
    pub fn merged_prices(&self) -> HashMap<String, f64> {
        let mut prices = self.custom_prices.clone();
        prices.extend(self.price_updates.iter().map(|(k, v)| (k.clone(), *v)));
        prices
    }

    /// Items that would be saved: kept lines with qty > 0, then merged additions
    pub fn items(&self) -> Vec<OrderItem> {
        let mut items: Vec<OrderItem> = self
            .lines
            .iter()
            .filter(|line| !line.removed && line.item.qty > 0)
            .map(|line| line.item.clone())
            .collect();

        for added in &self.added {
            match items.iter_mut().find(|item| item.name == added.name) {
                Some(existing) => existing.qty += added.qty,
                None => items.push(added.clone()),
            }
        }
        items
    }

    /// Consume the draft into `(customer, items, custom_prices)` ready to save
    pub fn finish(self) -> (String, Vec<OrderItem>, HashMap<String, f64>) {
        let items = self.items();
        let prices = self.merged_prices();
        (self.customer, items, prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft::new(
            "张三",
            vec![
                (OrderItem::new("apple", 2), 3.0),
                (OrderItem::new("banana", 1), 1.5),
                (OrderItem::new("pear", 4), 2.0),
            ],
            HashMap::from([("pear".to_string(), 2.0)]),
        )
    }

    #[test]
    fn test_save_replaces_entry() {
        let mut overlay = EditOverlay::new();
        overlay.save(
            "张三",
            vec![OrderItem::new("apple", 1)],
            HashMap::from([("apple".to_string(), 9.0)]),
        );
        let first_stamp = overlay.get("张三").unwrap().last_modified;

        overlay.save("张三", vec![OrderItem::new("pear", 2)], HashMap::new());

        let edit = overlay.get("张三").unwrap();
        assert_eq!(edit.items, vec![OrderItem::new("pear", 2)]);
        assert!(edit.custom_prices.is_empty());
        assert!(edit.last_modified >= first_stamp);
        assert_eq!(overlay.len(), 1);
        assert!(overlay.contains("张三"));
        assert!(!overlay.contains("李四"));
    }

    #[test]
    fn test_add_item_merges_quantities() {
        let mut draft = draft();
        draft.add_item("apple", 3);
        draft.add_item("kiwi", 2);
        draft.add_item("kiwi", 1);
        draft.add_item("mango", 0);

        assert_eq!(
            draft.items(),
            vec![
                OrderItem::new("apple", 5),
                OrderItem::new("banana", 1),
                OrderItem::new("pear", 4),
                OrderItem::new("kiwi", 3),
            ]
        );
    }

    #[test]
    fn test_zero_quantity_and_removed_lines_dropped() {
        let mut draft = draft();
        assert!(draft.set_quantity(0, 0));
        assert!(draft.remove(1));
        assert!(!draft.remove(7));

        assert_eq!(draft.items(), vec![OrderItem::new("pear", 4)]);
    }

    #[test]
    fn test_price_recorded_only_when_changed() {
        let mut draft = draft();
        assert!(!draft.set_price("apple", 3.0005));
        assert!(draft.set_price("banana", 1.2));
        assert!(!draft.set_price("unknown", 1.0));

        let prices = draft.merged_prices();
        assert_eq!(prices.get("banana"), Some(&1.2));
        assert_eq!(prices.get("pear"), Some(&2.0));
        assert!(!prices.contains_key("apple"));
    }

    #[test]
    fn test_finish_yields_save_arguments() {
        let mut draft = draft();
        draft.set_price("apple", 2.5);
        draft.add_item("banana", 2);

        assert_eq!(draft.customer(), "张三");
        let (customer, items, prices) = draft.finish();
        assert_eq!(customer, "张三");
        assert_eq!(items[1], OrderItem::new("banana", 3));
        assert_eq!(prices.get("apple"), Some(&2.5));
    }
}
