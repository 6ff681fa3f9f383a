//! In-memory cell grid decoded from a workbook byte buffer.
//!
//! The grid keeps absolute sheet positions: cell (1, 1) is `A1` even when the
//! first populated cell of the worksheet lies further down or to the right.

use crate::constants::MAX_GRID_CELLS;
use crate::error::{ReconcileError, Result};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// A single cell value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value for display; integral numbers have no fractional part
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Display form with surrounding whitespace removed
    pub fn trimmed(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            other => other.display(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Rectangular grid of cells addressed by 1-based (row, column)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl Grid {
    /// Build a grid from row-major cell values; ragged rows are allowed
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Decode the first worksheet of an xlsx/xls/xlsb/ods buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ReconcileError::NoWorksheet)?;
        let range = workbook.worksheet_range(&sheet_name)?;
        let grid = Self::from_range(&range, MAX_GRID_CELLS)?;

        debug!(
            "Decoded worksheet '{}': {} rows x {} columns",
            sheet_name,
            grid.height(),
            grid.width()
        );
        Ok(grid)
    }

    /// Copy a range into a grid anchored at A1, refusing ranges above `max_cells`
    fn from_range(range: &Range<Data>, max_cells: usize) -> Result<Self> {
        let Some((end_row, end_col)) = range.end() else {
            return Ok(Self::default());
        };

        let rows = end_row as usize + 1;
        let columns = end_col as usize + 1;
        if rows.saturating_mul(columns) > max_cells {
            return Err(ReconcileError::SheetTooLarge {
                rows,
                columns,
                limit: max_cells,
            });
        }

        let rows = (0..=end_row)
            .map(|r| {
                (0..=end_col)
                    .map(|c| range.get_value((r, c)).map(CellValue::from).unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok(Self::from_rows(rows))
    }

    /// Number of rows (the last populated row index)
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at 1-based (row, col); out-of-range positions read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(col - 1))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Trimmed display text of a cell
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).trimmed()
    }
}
