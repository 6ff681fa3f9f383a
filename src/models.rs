//! Core data structures for order reconciliation.
//!
//! Defines customer and product records extracted from the input sheet,
//! order items and overlay entries, and the load and summary reports
//! handed back to callers.

use crate::header::LocatorStrategy;
use crate::sheet::CellValue;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One row of the customer section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    /// 1-based sheet row the record was read from
    pub row: usize,
    /// Display-order label as written in the sheet
    pub seq: CellValue,
    /// Trimmed customer name, the key for every downstream lookup
    pub name: String,
    /// Trimmed free-text order description (empty when the cell is blank)
    pub content: String,
    pub phone: String,
    pub address: String,
}

/// One row of the product section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub price: f64,
}

/// Product price list in sheet row order.
///
/// Iteration order is insertion order, which keeps fuzzy and keyword
/// tie-breaks reproducible.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<ProductEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product, updating the price in place when the name already exists.
    ///
    /// Returns `false` when an existing entry was overwritten.
    pub fn insert(&mut self, name: impl Into<String>, price: f64) -> bool {
        let name = name.into();
        match self.index.get(&name) {
            Some(&idx) => {
                self.entries[idx].price = price;
                false
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(ProductEntry { name, price });
                true
            }
        }
    }

    /// Exact price lookup
    pub fn price(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|&idx| self.entries[idx].price)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for (name, price) in iter {
            catalog.insert(name, price);
        }
        catalog
    }
}

/// An ordered item with its quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: u32,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, qty: u32) -> Self {
        Self {
            name: name.into(),
            qty,
        }
    }
}

/// A customer's saved edits, layered over the parsed original order
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerEdit {
    pub items: Vec<OrderItem>,
    pub custom_prices: HashMap<String, f64>,
    pub last_modified: DateTime<Local>,
}

/// Which step of the price cascade produced a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchTier {
    Override,
    Exact,
    Fuzzy,
    Keyword,
    Unresolved,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchTier::Override => "override",
            MatchTier::Exact => "exact",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::Keyword => "keyword",
            MatchTier::Unresolved => "unresolved",
        };
        f.write_str(label)
    }
}

/// An order line with its resolved unit price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOrderLine {
    pub item: String,
    pub qty: u32,
    pub unit_price: f64,
    pub subtotal: f64,
    pub tier: MatchTier,
}

/// A recoverable problem found while loading a sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LoadWarning {
    /// Price cell was not a number; the product is priced at 0.0
    InvalidPrice {
        row: usize,
        product: String,
        raw: String,
    },
    /// Price was negative; the product is priced at 0.0
    NegativePrice {
        row: usize,
        product: String,
        price: f64,
    },
    /// Product name appeared again; the later price replaced the earlier one
    DuplicateProduct { row: usize, product: String },
    /// Customer name appeared again; the later row wins name lookups
    DuplicateCustomer { row: usize, name: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::InvalidPrice { row, product, raw } => write!(
                f,
                "row {}: price '{}' of '{}' is not a number, using 0.00",
                row, raw, product
            ),
            LoadWarning::NegativePrice {
                row,
                product,
                price,
            } => write!(
                f,
                "row {}: negative price {} of '{}', using 0.00",
                row, price, product
            ),
            LoadWarning::DuplicateProduct { row, product } => {
                write!(f, "row {}: product '{}' listed twice", row, product)
            }
            LoadWarning::DuplicateCustomer { row, name } => {
                write!(f, "row {}: customer '{}' listed twice", row, name)
            }
        }
    }
}

/// Outcome of a successful load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub customers: usize,
    pub products: usize,
    pub customer_strategy: LocatorStrategy,
    pub product_strategy: LocatorStrategy,
    pub warnings: Vec<LoadWarning>,
}

/// Per-customer order overview
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub item_count: usize,
    pub total: f64,
    pub edited: bool,
    pub last_modified: Option<DateTime<Local>>,
}

/// Session-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub customers: usize,
    pub products: usize,
    pub edited_customers: usize,
}

/// A custom price compared to the price the item would otherwise get
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub item: String,
    pub base_price: f64,
    pub new_price: f64,
}

impl PriceChange {
    pub fn diff(&self) -> f64 {
        self.new_price - self.base_price
    }
}
