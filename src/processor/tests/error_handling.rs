//! Error handling tests

use super::{fixture_engine, fixture_rows};
use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::models::OrderItem;
use crate::processor::OrderEngine;
use crate::sheet::{CellValue, Grid};
use std::collections::HashMap;

#[test]
fn test_missing_product_section() {
    let rows: Vec<Vec<CellValue>> = fixture_rows().into_iter().take(5).collect();
    let mut engine = OrderEngine::default();

    let result = engine.load_grid(&Grid::from_rows(rows));

    match result.unwrap_err() {
        ReconcileError::SectionNotFound {
            section, marker, ..
        } => {
            assert_eq!(section, "product");
            assert_eq!(marker, "商品汇总");
        }
        other => panic!("Expected SectionNotFound error, got {:?}", other),
    }
    assert!(!engine.is_loaded());
}

#[test]
fn test_empty_customer_section() {
    let mut rows = fixture_rows();
    // Blank out the first customer row so the roster ends immediately
    rows[2] = vec![];
    let mut engine = OrderEngine::default();

    let err = engine.load_grid(&Grid::from_rows(rows)).unwrap_err();

    assert!(err.is_structural());
    match err {
        ReconcileError::EmptySection { section } => assert_eq!(section, "customer"),
        other => panic!("Expected EmptySection error, got {:?}", other),
    }
}

#[test]
fn test_empty_product_section() {
    let rows: Vec<Vec<CellValue>> = fixture_rows().into_iter().take(8).collect();
    let mut engine = OrderEngine::default();

    match engine.load_grid(&Grid::from_rows(rows)).unwrap_err() {
        ReconcileError::EmptySection { section } => assert_eq!(section, "product"),
        other => panic!("Expected EmptySection error, got {:?}", other),
    }
}

#[test]
fn test_operations_before_load() {
    let mut engine = OrderEngine::default();

    assert!(matches!(engine.export_all(), Err(ReconcileError::NotLoaded)));
    assert!(matches!(
        engine.diagnose_price("张三", "苹果"),
        Err(ReconcileError::NotLoaded)
    ));
    assert!(matches!(
        engine.begin_edit("张三"),
        Err(ReconcileError::NotLoaded)
    ));
    assert!(matches!(
        engine.save_overlay("张三", Vec::new(), HashMap::new()),
        Err(ReconcileError::NotLoaded)
    ));
    assert!(engine.current_items("张三").is_empty());
}

#[test]
fn test_unknown_customer_rejected() {
    let mut engine = fixture_engine();

    let result = engine.save_overlay("赵六", vec![OrderItem::new("苹果", 1)], HashMap::new());
    match result {
        Err(ReconcileError::UnknownCustomer { name }) => assert_eq!(name, "赵六"),
        other => panic!("Expected UnknownCustomer error, got {:?}", other),
    }
    assert!(matches!(
        engine.begin_edit("赵六"),
        Err(ReconcileError::UnknownCustomer { .. })
    ));
    assert_eq!(engine.session_stats().edited_customers, 0);
}

#[test]
fn test_invalid_workbook_bytes() {
    let mut engine = OrderEngine::default();

    let err = engine.load_file(&[0u8; 64]).unwrap_err();

    assert!(matches!(err, ReconcileError::Workbook(_)));
    assert!(!err.is_structural());
}

#[test]
fn test_invalid_config_rejected() {
    let config = ReconcileConfig::default().with_fuzzy_threshold(1.5);

    match OrderEngine::new(config) {
        Err(ReconcileError::Configuration { message }) => {
            assert!(message.contains("threshold"));
        }
        other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
    }
}
