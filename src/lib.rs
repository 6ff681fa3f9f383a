//! Order Reconciler Library
//!
//! Reconciles the free-text customer orders of a semi-structured sign-up
//! sheet against the product price list found in the same sheet.
//!
//! This library provides tools for:
//! - Locating the customer and product sections by marker text or fixed headers
//! - Parsing `item xQty` order descriptions with Latin and CJK separators
//! - Resolving unit prices through custom prices, exact, fuzzy and keyword matching
//! - Layering per-customer edits over the parsed orders
//! - Exporting the reconciled orders as a styled xlsx workbook

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod matching;
pub mod models;
pub mod overlay;
pub mod parser;
pub mod processor;
pub mod resolver;
pub mod sheet;

// Re-export commonly used types
pub use config::ReconcileConfig;
pub use error::{ReconcileError, Result};
pub use models::{CustomerRecord, LoadReport, MatchTier, OrderItem, ResolvedOrderLine};
pub use processor::OrderEngine;
