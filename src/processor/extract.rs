//! Customer and product extraction from located sections.
//!
//! Extraction never fails: unreadable prices are coerced to 0.0 and reported
//! as [`LoadWarning`]s, and scans stop on the first empty customer row or
//! after a bounded run of blank product rows.

use crate::config::{CatalogColumns, CustomerColumns};
use crate::constants::PRICE_CURRENCY_SYMBOLS;
use crate::header::SectionBounds;
use crate::models::{Catalog, CustomerRecord, LoadWarning};
use crate::sheet::{CellValue, Grid};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Read customer rows from the customer data row until an empty seq/name,
/// the product section, or the end of the grid
pub fn extract_customers(
    grid: &Grid,
    bounds: &SectionBounds,
    columns: &CustomerColumns,
) -> (Vec<CustomerRecord>, Vec<LoadWarning>) {
    let stop_row = bounds
        .customer_stop_row()
        .unwrap_or(grid.height() + 1)
        .min(grid.height() + 1);

    let mut customers = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for row in bounds.customers.data_row..stop_row {
        let seq = grid.cell(row, columns.seq);
        let name = grid.text(row, columns.name);
        if seq.is_blank() || name.is_empty() {
            debug!("Customer section ends at row {}", row);
            break;
        }

        if !seen.insert(name.clone()) {
            warn!(
                "Duplicate customer '{}' at row {}; later row wins name lookups",
                name, row
            );
            warnings.push(LoadWarning::DuplicateCustomer {
                row,
                name: name.clone(),
            });
        }

        let seq = match seq {
            CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
            other => other.clone(),
        };

        customers.push(CustomerRecord {
            row,
            seq,
            name,
            content: grid.text(row, columns.content),
            phone: grid.text(row, columns.phone),
            address: grid.text(row, columns.address),
        });
    }

    (customers, warnings)
}

/// Read `(name, price)` rows from the product data row, skipping blank names
pub fn extract_catalog(
    grid: &Grid,
    bounds: &SectionBounds,
    columns: &CatalogColumns,
) -> (Catalog, Vec<LoadWarning>) {
    let last_row = bounds
        .product_stop_row()
        .map(|stop| stop - 1)
        .unwrap_or(grid.height())
        .min(grid.height());

    let mut catalog = Catalog::new();
    let mut warnings = Vec::new();
    let mut blank_run = 0usize;

    for row in bounds.products.data_row..=last_row {
        let name = grid.text(row, columns.name);
        if name.is_empty() {
            blank_run += 1;
            if blank_run > columns.max_blank_rows {
                debug!(
                    "Product scan stopped at row {} after {} blank rows",
                    row, blank_run
                );
                break;
            }
            continue;
        }
        blank_run = 0;

        let price = match parse_price(grid.cell(row, columns.price)) {
            Ok(price) if price >= 0.0 => price,
            Ok(price) => {
                warn!("Row {}: negative price {} for '{}'", row, price, name);
                warnings.push(LoadWarning::NegativePrice {
                    row,
                    product: name.clone(),
                    price,
                });
                0.0
            }
            Err(raw) => {
                warn!("Row {}: price '{}' for '{}' is not a number", row, raw, name);
                warnings.push(LoadWarning::InvalidPrice {
                    row,
                    product: name.clone(),
                    raw,
                });
                0.0
            }
        };

        if !catalog.insert(name.clone(), price) {
            warnings.push(LoadWarning::DuplicateProduct { row, product: name });
        }
    }

    (catalog, warnings)
}

/// Numeric value of a price cell; the raw text is returned when it is not a number
fn parse_price(cell: &CellValue) -> Result<f64, String> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Ok(*n),
        CellValue::Text(s) => {
            let cleaned = s
                .trim()
                .trim_start_matches(PRICE_CURRENCY_SYMBOLS)
                .trim();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|price| price.is_finite())
                .ok_or_else(|| s.clone())
        }
        other => Err(other.display()),
    }
}
