//! Order reconciliation engine.
//!
//! [`OrderEngine`] is the session context: it owns the customer list, the
//! product catalog and the edit overlay of one loaded sheet, and exposes the
//! operations a front end calls. Loading a sheet replaces all three at once;
//! a failed load leaves the previous state untouched.

pub mod aggregate;
pub mod extract;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::extract::{extract_catalog, extract_customers};
use self::writer::ExportSerializer;

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, Result};
use crate::header::locate_sections;
use crate::models::{Catalog, CustomerEdit, CustomerRecord, LoadReport, OrderItem, PriceChange};
use crate::overlay::{EditOverlay, OrderDraft};
use crate::parser::OrderTextParser;
use crate::resolver::{PriceResolution, PriceResolver};
use crate::sheet::Grid;

use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Everything extracted from one sheet
#[derive(Debug, Default)]
struct LoadedSheet {
    customers: Vec<CustomerRecord>,
    /// Name -> index into `customers`; a later duplicate name wins
    by_name: HashMap<String, usize>,
    catalog: Catalog,
    /// Workbook bytes the sheet was decoded from; `None` for grids loaded directly
    source: Option<Vec<u8>>,
}

/// Session context for one loaded order sheet
#[derive(Debug)]
pub struct OrderEngine {
    config: ReconcileConfig,
    parser: OrderTextParser,
    sheet: Option<LoadedSheet>,
    overlay: EditOverlay,
}

impl Default for OrderEngine {
    fn default() -> Self {
        let config = ReconcileConfig::default();
        Self {
            parser: OrderTextParser::new(&config.parser),
            config,
            sheet: None,
            overlay: EditOverlay::new(),
        }
    }
}

impl OrderEngine {
    /// Create an engine with no sheet loaded
    pub fn new(config: ReconcileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: OrderTextParser::new(&config.parser),
            config,
            sheet: None,
            overlay: EditOverlay::new(),
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.sheet.is_some()
    }

    /// Decode a workbook buffer and replace the session state with its contents
    pub fn load_file(&mut self, bytes: &[u8]) -> Result<LoadReport> {
        let grid = Grid::from_bytes(bytes)?;
        let (mut sheet, report) = self.extract(&grid)?;
        sheet.source = Some(bytes.to_vec());
        Ok(self.install(sheet, report))
    }

    /// Like [`load_file`](Self::load_file), but keeps the current state and
    /// overlays when `bytes` is the file already loaded. Returns `None` then.
    pub fn load_file_if_changed(&mut self, bytes: &[u8]) -> Result<Option<LoadReport>> {
        let unchanged = self
            .sheet
            .as_ref()
            .and_then(|sheet| sheet.source.as_deref())
            .is_some_and(|loaded| loaded == bytes);
        if unchanged {
            debug!("Workbook unchanged, keeping {} overlays", self.overlay.len());
            return Ok(None);
        }
        self.load_file(bytes).map(Some)
    }

    /// Replace the session state with the contents of an already decoded grid
    pub fn load_grid(&mut self, grid: &Grid) -> Result<LoadReport> {
        let (sheet, report) = self.extract(grid)?;
        Ok(self.install(sheet, report))
    }

    /// Drop the loaded sheet and every overlay
    pub fn reset(&mut self) {
        self.sheet = None;
        self.overlay.clear();
    }

    fn extract(&self, grid: &Grid) -> Result<(LoadedSheet, LoadReport)> {
        let bounds = locate_sections(grid, &self.config.sections)?;
        let (customers, mut warnings) =
            extract_customers(grid, &bounds, &self.config.customer_columns);
        let (catalog, catalog_warnings) =
            extract_catalog(grid, &bounds, &self.config.catalog_columns);
        warnings.extend(catalog_warnings);

        if customers.is_empty() {
            return Err(ReconcileError::EmptySection {
                section: "customer".to_string(),
            });
        }
        if catalog.is_empty() {
            return Err(ReconcileError::EmptySection {
                section: "product".to_string(),
            });
        }

        let by_name = customers
            .iter()
            .enumerate()
            .map(|(idx, customer)| (customer.name.clone(), idx))
            .collect();

        let report = LoadReport {
            customers: customers.len(),
            products: catalog.len(),
            customer_strategy: bounds.customers.strategy,
            product_strategy: bounds.products.strategy,
            warnings,
        };
        let sheet = LoadedSheet {
            customers,
            by_name,
            catalog,
            source: None,
        };
        Ok((sheet, report))
    }

    fn install(&mut self, sheet: LoadedSheet, report: LoadReport) -> LoadReport {
        if !self.overlay.is_empty() {
            debug!("Discarding {} overlays of the previous sheet", self.overlay.len());
        }
        self.overlay.clear();
        self.sheet = Some(sheet);

        info!(
            "Loaded {} customers and {} products ({} warnings)",
            report.customers,
            report.products,
            report.warnings.len()
        );
        report
    }

    /// Customers in sheet order; empty when nothing is loaded
    pub fn list_customers(&self) -> &[CustomerRecord] {
        self.sheet
            .as_ref()
            .map(|sheet| sheet.customers.as_slice())
            .unwrap_or_default()
    }

    /// Customer record by name (the last row with that name)
    pub fn customer(&self, name: &str) -> Option<&CustomerRecord> {
        let sheet = self.sheet.as_ref()?;
        sheet.by_name.get(name).map(|&idx| &sheet.customers[idx])
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.sheet.as_ref().map(|sheet| &sheet.catalog)
    }

    /// Saved edits of a customer
    pub fn overlay(&self, name: &str) -> Option<&CustomerEdit> {
        self.overlay.get(name)
    }

    pub fn is_edited(&self, name: &str) -> bool {
        self.overlay.contains(name)
    }

    /// Replace a customer's saved edits
    pub fn save_overlay(
        &mut self,
        name: &str,
        items: Vec<OrderItem>,
        custom_prices: HashMap<String, f64>,
    ) -> Result<&CustomerEdit> {
        if !self.is_loaded() {
            return Err(ReconcileError::NotLoaded);
        }
        if self.customer(name).is_none() {
            return Err(ReconcileError::UnknownCustomer {
                name: name.to_string(),
            });
        }
        Ok(self.overlay.save(name, items, custom_prices))
    }

    /// Saved items if the customer was edited, otherwise the parsed original order
    pub fn current_items(&self, name: &str) -> Vec<OrderItem> {
        if let Some(edit) = self.overlay.get(name) {
            return edit.items.clone();
        }
        self.original_items(name)
    }

    /// Items parsed from the customer's content cell, ignoring any edits
    pub fn original_items(&self, name: &str) -> Vec<OrderItem> {
        self.customer(name)
            .map(|customer| self.parser.parse(&customer.content))
            .unwrap_or_default()
    }

    fn resolver(&self) -> Option<PriceResolver<'_>> {
        self.catalog()
            .map(|catalog| PriceResolver::new(catalog, &self.config.matching))
    }

    /// Unit price of an item for a customer
    pub fn resolve_price(&self, customer: &str, item: &str) -> f64 {
        self.resolver()
            .map(|resolver| resolver.resolve(self.overlay.custom_prices(customer), item))
            .unwrap_or(0.0)
    }

    /// Unit price of an item with the tier, matched key and suggestions behind it
    pub fn diagnose_price(&self, customer: &str, item: &str) -> Result<PriceResolution> {
        let resolver = self.resolver().ok_or(ReconcileError::NotLoaded)?;
        Ok(resolver.diagnose(self.overlay.custom_prices(customer), item))
    }

    /// Open an edit of a customer's current order
    pub fn begin_edit(&self, name: &str) -> Result<OrderDraft> {
        let resolver = self.resolver().ok_or(ReconcileError::NotLoaded)?;
        if self.customer(name).is_none() {
            return Err(ReconcileError::UnknownCustomer {
                name: name.to_string(),
            });
        }

        let custom_prices = self.overlay.custom_prices(name).cloned().unwrap_or_default();
        let lines = self
            .current_items(name)
            .into_iter()
            .map(|item| {
                let price = resolver.resolve(Some(&custom_prices), &item.name);
                (item, price)
            })
            .collect();
        Ok(OrderDraft::new(name, lines, custom_prices))
    }

    /// Save a finished draft as the customer's overlay
    pub fn commit_draft(&mut self, draft: OrderDraft) -> Result<&CustomerEdit> {
        debug!(
            "Committing draft for '{}' with {} price updates",
            draft.customer(),
            draft.price_updates().len()
        );
        let (name, items, custom_prices) = draft.finish();
        self.save_overlay(&name, items, custom_prices)
    }

    /// Total the draft would have once committed
    pub fn preview_total(&self, draft: &OrderDraft) -> f64 {
        let Some(resolver) = self.resolver() else {
            return 0.0;
        };
        let prices = draft.merged_prices();
        draft
            .items()
            .iter()
            .map(|item| resolver.resolve(Some(&prices), &item.name) * f64::from(item.qty))
            .sum()
    }

    /// Draft price updates compared with the price each item gets without overrides
    pub fn price_changes(&self, draft: &OrderDraft) -> Vec<PriceChange> {
        let Some(resolver) = self.resolver() else {
            return Vec::new();
        };
        let mut changes: Vec<PriceChange> = draft
            .price_updates()
            .iter()
            .map(|(item, &new_price)| PriceChange {
                item: item.clone(),
                base_price: resolver.resolve(None, item),
                new_price,
            })
            .collect();
        changes.sort_by(|a, b| a.item.cmp(&b.item));
        changes
    }

    /// Render every customer's current order into an xlsx buffer
    pub fn export_all(&self) -> Result<Vec<u8>> {
        if !self.is_loaded() {
            warn!("Export requested with no workbook loaded");
            return Err(ReconcileError::NotLoaded);
        }
        let serializer = ExportSerializer::new(&self.config.export);
        let table = serializer.build_table(self);
        serializer.render(&table)
    }
}
