//! Order totals.
//!
//! Totals are recomputed from the current items on every call; nothing is
//! cached because overlays can change between reads.

use super::OrderEngine;
use crate::models::{MatchTier, OrderSummary, ResolvedOrderLine, SessionStats};
use crate::resolver::{PriceResolution, PriceResolver};
use tracing::debug;

/// A priced line that did not hit an override or an exact catalog key
#[derive(Debug, Clone, PartialEq)]
pub struct LineReview {
    pub customer: String,
    pub qty: u32,
    pub resolution: PriceResolution,
}

impl OrderEngine {
    /// Current items of a customer with unit prices and subtotals
    pub fn resolved_lines(&self, customer: &str) -> Vec<ResolvedOrderLine> {
        let Some(catalog) = self.catalog() else {
            return Vec::new();
        };
        let resolver = PriceResolver::new(catalog, &self.config.matching);
        let overrides = self.overlay.custom_prices(customer);

        self.current_items(customer)
            .into_iter()
            .map(|item| {
                let (unit_price, tier) = resolver.resolve_with_tier(overrides, &item.name);
                ResolvedOrderLine {
                    subtotal: unit_price * f64::from(item.qty),
                    item: item.name,
                    qty: item.qty,
                    unit_price,
                    tier,
                }
            })
            .collect()
    }

    /// Σ qty × unit price over the customer's current items
    pub fn customer_total(&self, customer: &str) -> f64 {
        self.current_items(customer)
            .iter()
            .map(|item| f64::from(item.qty) * self.resolve_price(customer, &item.name))
            .sum()
    }

    /// Sum of every customer's total, in sheet order
    pub fn grand_total(&self) -> f64 {
        let total: f64 = self
            .list_customers()
            .iter()
            .map(|customer| self.customer_total(&customer.name))
            .sum();
        debug!("Grand total over {} customers: {:.2}", self.list_customers().len(), total);
        total
    }

    pub fn order_summary(&self, customer: &str) -> OrderSummary {
        let edit = self.overlay(customer);
        OrderSummary {
            item_count: self.current_items(customer).len(),
            total: self.customer_total(customer),
            edited: self.is_edited(customer),
            last_modified: edit.map(|edit| edit.last_modified),
        }
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            customers: self.list_customers().len(),
            products: self.catalog().map_or(0, |catalog| catalog.len()),
            edited_customers: self.overlay.len(),
        }
    }

    /// Every fuzzy, keyword or unresolved line across all customers, in sheet order
    pub fn review_lines(&self) -> Vec<LineReview> {
        let mut reviews = Vec::new();
        for customer in self.list_customers() {
            for item in self.current_items(&customer.name) {
                let Ok(resolution) = self.diagnose_price(&customer.name, &item.name) else {
                    continue;
                };
                if matches!(resolution.tier, MatchTier::Override | MatchTier::Exact) {
                    continue;
                }
                reviews.push(LineReview {
                    customer: customer.name.clone(),
                    qty: item.qty,
                    resolution,
                });
            }
        }
        reviews
    }
}
