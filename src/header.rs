//! Section header location.
//!
//! Finds where the customer roster and the product price list start inside
//! an otherwise unstructured sheet and calculates the row boundaries used by
//! the extractors.

use crate::config::SectionConfig;
use crate::error::{ReconcileError, Result};
use crate::sheet::Grid;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// How a section was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocatorStrategy {
    /// A row whose first two cells equal literal header labels
    FixedHeader,
    /// A cell containing a marker text, header on the following row
    MarkerText,
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorStrategy::FixedHeader => f.write_str("fixed header"),
            LocatorStrategy::MarkerText => f.write_str("marker text"),
        }
    }
}

/// Row boundaries of one located section (all 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub strategy: LocatorStrategy,
    /// First row belonging to the section: the marker row or the header row
    pub anchor_row: usize,
    pub header_row: usize,
    pub data_row: usize,
}

/// Both sections of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub customers: Section,
    pub products: Section,
}

impl SectionBounds {
    /// Row at which customer extraction must stop, if the product section lies below it
    pub fn customer_stop_row(&self) -> Option<usize> {
        (self.products.anchor_row > self.customers.header_row).then_some(self.products.anchor_row)
    }

    /// Row at which product extraction must stop, if the customer section lies below it
    pub fn product_stop_row(&self) -> Option<usize> {
        (self.customers.anchor_row > self.products.header_row).then_some(self.customers.anchor_row)
    }
}

/// Row index (1-based) of the first cell, in row-major order, whose text contains `marker`
pub fn find_marker_row(grid: &Grid, marker: &str) -> Option<usize> {
    (1..=grid.height()).find(|&row| {
        (1..=grid.width()).any(|col| {
            grid.cell(row, col)
                .as_text()
                .is_some_and(|text| text.contains(marker))
        })
    })
}

/// Row index (1-based) of the first row whose column 1 and column 2 equal the labels
pub fn find_header_row(grid: &Grid, labels: (&str, &str)) -> Option<usize> {
    (1..=grid.height()).find(|&row| grid.text(row, 1) == labels.0 && grid.text(row, 2) == labels.1)
}

/// Locate one section: fixed header first, marker text as fallback
pub fn locate_section(
    grid: &Grid,
    section: &str,
    marker: &str,
    header_labels: (&str, &str),
) -> Result<Section> {
    if let Some(header_row) = find_header_row(grid, header_labels) {
        return Ok(Section {
            strategy: LocatorStrategy::FixedHeader,
            anchor_row: header_row,
            header_row,
            data_row: header_row + 1,
        });
    }

    if let Some(marker_row) = find_marker_row(grid, marker) {
        return Ok(Section {
            strategy: LocatorStrategy::MarkerText,
            anchor_row: marker_row,
            header_row: marker_row + 1,
            data_row: marker_row + 2,
        });
    }

    Err(ReconcileError::SectionNotFound {
        section: section.to_string(),
        marker: marker.to_string(),
        header: format!("{} | {}", header_labels.0, header_labels.1),
    })
}

/// Locate the customer and product sections of a sheet
pub fn locate_sections(grid: &Grid, config: &SectionConfig) -> Result<SectionBounds> {
    let customers = locate_section(
        grid,
        "customer",
        &config.customer_marker,
        (&config.customer_header.0, &config.customer_header.1),
    )?;
    let products = locate_section(
        grid,
        "product",
        &config.product_marker,
        (&config.product_header.0, &config.product_header.1),
    )?;

    debug!(
        "Located sections: customers header row {} ({}), products header row {} ({})",
        customers.header_row, customers.strategy, products.header_row, products.strategy
    );

    Ok(SectionBounds {
        customers,
        products,
    })
}
