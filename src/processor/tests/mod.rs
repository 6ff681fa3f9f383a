//! Engine tests for the processor module
//!
//! Exercise loading, pricing, overlays and export against a small order
//! sheet laid out the way real sign-up sheets are.

pub mod error_handling;
pub mod overlay_edits;

use crate::processor::OrderEngine;
use crate::sheet::{CellValue, Grid};
use rust_xlsxwriter::Workbook;

fn text(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::from(s)
    }
}

/// Marker-text sheet with three customers and three products.
///
/// 张三 totals 16.00 (exact), 李四 10.00 (fuzzy), 王五 0.00 (no order).
pub fn fixture_rows() -> Vec<Vec<CellValue>> {
    vec![
        vec![text("2024 报名名单")],
        vec![
            text("序号"),
            text("姓名"),
            text("订购内容"),
            text(""),
            text("电话"),
            text("地址"),
        ],
        vec![
            CellValue::Number(1.0),
            text(" 张三 "),
            text("苹果 x2，香蕉 x3"),
            text(""),
            text("13800138000"),
            text("北京市朝阳区"),
        ],
        vec![
            CellValue::Number(2.0),
            text("李四"),
            text("organic apple x1, 总价 x5"),
            text(""),
            text("13900139000"),
            text("上海市"),
        ],
        vec![CellValue::Number(3.0), text("王五"), text("")],
        vec![],
        vec![text("商品汇总")],
        vec![text("商品"), text("价格")],
        vec![text("苹果"), CellValue::Number(5.0)],
        vec![text("香蕉"), CellValue::Number(2.0)],
        vec![text("organic red apple"), CellValue::Number(10.0)],
    ]
}

pub fn fixture_grid() -> Grid {
    Grid::from_rows(fixture_rows())
}

/// Engine with the fixture sheet loaded
pub fn fixture_engine() -> OrderEngine {
    let mut engine = OrderEngine::default();
    engine.load_grid(&fixture_grid()).unwrap();
    engine
}

/// The fixture sheet encoded as an xlsx buffer
pub fn fixture_workbook() -> Vec<u8> {
    workbook_from_rows(&fixture_rows())
}

/// Encode text and number cells as an xlsx buffer
pub fn workbook_from_rows(rows: &[Vec<CellValue>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Number(n) => {
                    worksheet.write_number(r as u32, c as u16, *n).unwrap();
                }
                CellValue::Text(s) => {
                    worksheet.write_string(r as u32, c as u16, s).unwrap();
                }
                _ => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}
