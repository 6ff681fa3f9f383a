//! Export writing for reconciled orders
//!
//! Builds one row per customer from the engine's current state and renders
//! it into a styled single-sheet xlsx buffer with a frozen header row.

use super::OrderEngine;
use crate::config::ExportConfig;
use crate::constants::EXPORT_FILE_NAME_FORMAT;
use crate::error::Result;
use crate::models::ResolvedOrderLine;
use crate::sheet::CellValue;

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use tracing::debug;

/// One exported customer row
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub seq: CellValue,
    pub name: String,
    /// One `name xQty (@price = subtotal)` line per item
    pub items_detail: String,
    pub total: String,
    pub phone: String,
    pub address: String,
}

/// Header labels plus customer rows in sheet order
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub headers: [String; 6],
    pub rows: Vec<ExportRow>,
}

/// Serializer for the clean order export
#[derive(Debug, Clone, Copy)]
pub struct ExportSerializer<'a> {
    config: &'a ExportConfig,
}

impl<'a> ExportSerializer<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Format one resolved line as `name xQty (@price = subtotal)`
    pub fn format_line(&self, line: &ResolvedOrderLine) -> String {
        format!(
            "{} x{} (@{} = {})",
            line.item,
            line.qty,
            self.config.money(line.unit_price),
            self.config.money(line.subtotal)
        )
    }

    /// Collect every customer's current order
    pub fn build_table(&self, engine: &OrderEngine) -> ExportTable {
        let rows = engine
            .list_customers()
            .iter()
            .map(|customer| {
                let lines = engine.resolved_lines(&customer.name);
                let total: f64 = lines.iter().map(|line| line.subtotal).sum();
                let items_detail = lines
                    .iter()
                    .map(|line| self.format_line(line))
                    .collect::<Vec<_>>()
                    .join("\n");

                ExportRow {
                    seq: customer.seq.clone(),
                    name: customer.name.clone(),
                    items_detail,
                    total: self.config.money(total),
                    phone: customer.phone.clone(),
                    address: customer.address.clone(),
                }
            })
            .collect();

        ExportTable {
            headers: self.config.headers.clone(),
            rows,
        }
    }

    /// Render a table into xlsx bytes
    pub fn render(&self, table: &ExportTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.sheet_name)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(self.config.header_fill))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);
        let cell_format = Format::new()
            .set_align(FormatAlign::Top)
            .set_text_wrap()
            .set_border(FormatBorder::Thin);

        for (col, width) in self.config.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        for (col, header) in table.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (idx, row) in table.rows.iter().enumerate() {
            let r = (idx + 1) as u32;
            match &row.seq {
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(r, 0, *n, &cell_format)?;
                }
                CellValue::Empty => {
                    worksheet.write_blank(r, 0, &cell_format)?;
                }
                other => {
                    worksheet.write_string_with_format(r, 0, other.display(), &cell_format)?;
                }
            }
            let texts = [
                &row.name,
                &row.items_detail,
                &row.total,
                &row.phone,
                &row.address,
            ];
            for (offset, text) in texts.into_iter().enumerate() {
                worksheet.write_string_with_format(r, (offset + 1) as u16, text, &cell_format)?;
            }
        }

        worksheet.set_freeze_panes(1, 0)?;

        let bytes = workbook.save_to_buffer()?;
        debug!(
            "Rendered export: {} rows, {} bytes",
            table.rows.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Default file name for an export created at `now`
pub fn export_file_name(now: DateTime<Local>) -> String {
    now.format(EXPORT_FILE_NAME_FORMAT).to_string()
}
