//! Configuration management and validation.
//!
//! Provides the configuration structures for section location, column
//! layout, order text parsing, price matching and export formatting. Every
//! field has a default taken from [`crate::constants`], so a config file only
//! needs to name what it changes.

use crate::constants;
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Markers and header labels used to find the two sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub customer_marker: String,
    pub product_marker: String,
    /// Column-1/column-2 labels of the customer header row
    pub customer_header: (String, String),
    /// Column-1/column-2 labels of the product header row
    pub product_header: (String, String),
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            customer_marker: constants::CUSTOMER_SECTION_MARKER.to_string(),
            product_marker: constants::PRODUCT_SECTION_MARKER.to_string(),
            customer_header: (
                constants::CUSTOMER_HEADER_LABELS.0.to_string(),
                constants::CUSTOMER_HEADER_LABELS.1.to_string(),
            ),
            product_header: (
                constants::PRODUCT_HEADER_LABELS.0.to_string(),
                constants::PRODUCT_HEADER_LABELS.1.to_string(),
            ),
        }
    }
}

/// 1-based column positions of the customer section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerColumns {
    pub seq: usize,
    pub name: usize,
    pub content: usize,
    pub phone: usize,
    pub address: usize,
}

impl Default for CustomerColumns {
    fn default() -> Self {
        use constants::customer_columns::*;
        Self {
            seq: SEQ,
            name: NAME,
            content: CONTENT,
            phone: PHONE,
            address: ADDRESS,
        }
    }
}

/// 1-based column positions of the product section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub name: usize,
    pub price: usize,
    /// Consecutive blank rows tolerated before the product scan stops
    pub max_blank_rows: usize,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            name: constants::product_columns::NAME,
            price: constants::product_columns::PRICE,
            max_blank_rows: constants::MAX_CONSECUTIVE_BLANK_ROWS,
        }
    }
}

/// Order text parsing rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Item names containing any of these are total lines and are skipped
    pub total_markers: Vec<String>,
    /// Characters stripped from both ends of an item name (whitespace always is)
    pub strip_chars: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            total_markers: constants::TOTAL_LINE_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strip_chars: constants::ITEM_NAME_STRIP_CHARS.to_string(),
        }
    }
}

/// Price cascade thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub fuzzy_threshold: f64,
    pub keyword_min_shared: usize,
    pub max_suggestions: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: constants::FUZZY_MATCH_THRESHOLD,
            keyword_min_shared: constants::KEYWORD_MIN_SHARED_TOKENS,
            max_suggestions: constants::MAX_SUGGESTIONS,
        }
    }
}

/// Export workbook layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_name: String,
    pub headers: [String; 6],
    pub column_widths: [f64; 6],
    pub header_fill: u32,
    pub currency_symbol: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: constants::EXPORT_SHEET_NAME.to_string(),
            headers: constants::EXPORT_HEADERS.map(str::to_string),
            column_widths: constants::EXPORT_COLUMN_WIDTHS,
            header_fill: constants::EXPORT_HEADER_FILL,
            currency_symbol: constants::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl ExportConfig {
    /// Format an amount with the configured currency symbol and two decimals
    pub fn money(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

/// Global configuration for order reconciliation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub sections: SectionConfig,
    pub customer_columns: CustomerColumns,
    pub catalog_columns: CatalogColumns,
    pub parser: ParserConfig,
    pub matching: MatchingConfig,
    pub export: ExportConfig,
}

impl ReconcileConfig {
    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ReconcileError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Use different section markers
    pub fn with_markers(
        mut self,
        customer_marker: impl Into<String>,
        product_marker: impl Into<String>,
    ) -> Self {
        self.sections.customer_marker = customer_marker.into();
        self.sections.product_marker = product_marker.into();
        self
    }

    /// Use a different fuzzy similarity threshold
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.matching.fuzzy_threshold = threshold;
        self
    }

    /// Use a different currency symbol in exported amounts
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.export.currency_symbol = symbol.into();
        self
    }

    /// Use a different blank-row cap for the product scan
    pub fn with_max_blank_rows(mut self, max_blank_rows: usize) -> Self {
        self.catalog_columns.max_blank_rows = max_blank_rows;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(ReconcileError::Configuration { message });

        if self.sections.customer_marker.is_empty() || self.sections.product_marker.is_empty() {
            return invalid("section markers must not be empty".to_string());
        }

        let cc = &self.customer_columns;
        let columns = [
            ("customer seq", cc.seq),
            ("customer name", cc.name),
            ("customer content", cc.content),
            ("customer phone", cc.phone),
            ("customer address", cc.address),
            ("product name", self.catalog_columns.name),
            ("product price", self.catalog_columns.price),
        ];
        if let Some((label, _)) = columns.iter().find(|(_, col)| *col == 0) {
            return invalid(format!("{} column is 1-based and must not be 0", label));
        }

        let threshold = self.matching.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return invalid(format!(
                "fuzzy threshold must be within [0, 1], got {}",
                threshold
            ));
        }

        if self.export.sheet_name.trim().is_empty() {
            return invalid("export sheet name must not be empty".to_string());
        }

        Ok(())
    }
}
