//! Overlay and draft editing tests

use super::fixture_engine;
use crate::models::{MatchTier, OrderItem};
use std::collections::HashMap;

#[test]
fn test_save_overlay_replaces_current_items() {
    let mut engine = fixture_engine();
    let items = vec![OrderItem::new("香蕉", 4)];

    let edit = engine.save_overlay("张三", items.clone(), HashMap::new()).unwrap();
    assert_eq!(edit.items, items);

    assert_eq!(engine.current_items("张三"), items);
    assert_eq!(
        engine.original_items("张三"),
        vec![OrderItem::new("苹果", 2), OrderItem::new("香蕉", 3)]
    );
    assert!(engine.order_summary("张三").edited);
    assert!(engine.is_edited("张三"));
    assert!(!engine.is_edited("李四"));
    assert!(!engine.order_summary("李四").edited);
}

#[test]
fn test_repeated_save_is_idempotent() {
    let mut engine = fixture_engine();
    let items = vec![OrderItem::new("苹果", 1)];
    let prices = HashMap::from([("苹果".to_string(), 4.5)]);

    engine.save_overlay("李四", items.clone(), prices.clone()).unwrap();
    let first_total = engine.grand_total();
    engine.save_overlay("李四", items.clone(), prices).unwrap();

    assert_eq!(engine.grand_total(), first_total);
    assert_eq!(engine.current_items("李四"), items);
    assert_eq!(engine.session_stats().edited_customers, 1);
}

#[test]
fn test_custom_price_beats_catalog() {
    let mut engine = fixture_engine();
    engine
        .save_overlay(
            "张三",
            vec![OrderItem::new("苹果", 2)],
            HashMap::from([("苹果".to_string(), 4.0)]),
        )
        .unwrap();

    assert_eq!(engine.resolve_price("张三", "苹果"), 4.0);
    // Other customers still get the catalog price
    assert_eq!(engine.resolve_price("李四", "苹果"), 5.0);

    let lines = engine.resolved_lines("张三");
    assert_eq!(lines[0].tier, MatchTier::Override);
    assert_eq!(engine.customer_total("张三"), 8.0);
}

#[test]
fn test_grand_total_moves_by_customer_delta() {
    let mut engine = fixture_engine();
    let before_grand = engine.grand_total();
    let before_customer = engine.customer_total("王五");

    engine
        .save_overlay(
            "王五",
            vec![OrderItem::new("香蕉", 5), OrderItem::new("organic red apple", 1)],
            HashMap::new(),
        )
        .unwrap();

    let delta = engine.customer_total("王五") - before_customer;
    assert_eq!(delta, 20.0);
    assert_eq!(engine.grand_total(), before_grand + delta);
}

#[test]
fn test_draft_commit_flow() {
    let mut engine = fixture_engine();
    let mut draft = engine.begin_edit("张三").unwrap();
    assert_eq!(draft.customer(), "张三");

    assert!(draft.set_price("苹果", 4.0));
    draft.add_item("香蕉", 1);
    draft.add_item("organic red apple", 1);

    // 2 x 4.00 + 4 x 2.00 + 1 x 10.00
    assert_eq!(engine.preview_total(&draft), 26.0);

    let changes = engine.price_changes(&draft);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].item, "苹果");
    assert_eq!(changes[0].base_price, 5.0);
    assert_eq!(changes[0].diff(), -1.0);

    // Nothing is saved before commit
    assert!(engine.overlay("张三").is_none());

    let edit = engine.commit_draft(draft).unwrap();
    assert_eq!(
        edit.items,
        vec![
            OrderItem::new("苹果", 2),
            OrderItem::new("香蕉", 4),
            OrderItem::new("organic red apple", 1),
        ]
    );
    assert_eq!(edit.custom_prices.get("苹果"), Some(&4.0));
    assert_eq!(engine.customer_total("张三"), 26.0);
}

#[test]
fn test_draft_reopens_saved_edit() {
    let mut engine = fixture_engine();
    engine
        .save_overlay(
            "李四",
            vec![OrderItem::new("organic apple", 3)],
            HashMap::from([("organic apple".to_string(), 7.0)]),
        )
        .unwrap();

    let mut draft = engine.begin_edit("李四").unwrap();
    assert!(draft.set_quantity(0, 0));
    draft.add_item("苹果", 1);
    let edit = engine.commit_draft(draft).unwrap();

    assert_eq!(edit.items, vec![OrderItem::new("苹果", 1)]);
    // Earlier custom prices survive the new save
    assert_eq!(edit.custom_prices.get("organic apple"), Some(&7.0));
}
