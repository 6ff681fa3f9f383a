//! Error handling for order reconciliation operations.
//!
//! Structural failures abort a load as a whole. Coercion problems and lookup
//! misses never surface here: they are recovered where they happen and
//! reported through [`crate::models::LoadReport`] or the price diagnostics.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook could not be decoded: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    #[error(
        "Cannot find the {section} section: no cell containing marker '{marker}' and no header row '{header}'"
    )]
    SectionNotFound {
        section: String,
        marker: String,
        header: String,
    },

    #[error(
        "Worksheet spans {rows} rows x {columns} columns, more than the {limit} cells supported"
    )]
    SheetTooLarge {
        rows: usize,
        columns: usize,
        limit: usize,
    },

    #[error("The {section} section contains no rows")]
    EmptySection { section: String },

    #[error("No workbook has been loaded")]
    NotLoaded,

    #[error("Unknown customer: {name}")]
    UnknownCustomer { name: String },

    #[error("Export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ReconcileError {
    /// True for failures caused by the layout of the input sheet.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ReconcileError::SectionNotFound { .. }
                | ReconcileError::EmptySection { .. }
                | ReconcileError::SheetTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
