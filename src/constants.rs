//! Application constants for the order reconciler
//!
//! Section markers, header labels, column positions, matching thresholds and
//! export layout used as defaults throughout the crate.

// =============================================================================
// Section Markers and Header Labels
// =============================================================================

/// Marker text identifying the customer roster section
pub const CUSTOMER_SECTION_MARKER: &str = "报名名单";

/// Marker text identifying the product summary section
pub const PRODUCT_SECTION_MARKER: &str = "商品汇总";

/// Literal column-1/column-2 labels of the customer header row
pub const CUSTOMER_HEADER_LABELS: (&str, &str) = ("序号", "客户名称");

/// Literal column-1/column-2 labels of the product header row
pub const PRODUCT_HEADER_LABELS: (&str, &str) = ("商品名称", "单价");

// =============================================================================
// Column Positions (1-based)
// =============================================================================

/// Customer section columns: (sequence, name, content, [unused], phone, address)
pub mod customer_columns {
    pub const SEQ: usize = 1;
    pub const NAME: usize = 2;
    pub const CONTENT: usize = 3;
    pub const PHONE: usize = 5;
    pub const ADDRESS: usize = 6;
}

/// Product section columns: (name, price, ...)
pub mod product_columns {
    pub const NAME: usize = 1;
    pub const PRICE: usize = 2;
}

/// Consecutive blank rows tolerated inside the product section
pub const MAX_CONSECUTIVE_BLANK_ROWS: usize = 100;

/// Largest decoded worksheet, in cells (rows x columns up to the last used cell)
pub const MAX_GRID_CELLS: usize = 5_000_000;

/// Currency symbols tolerated in front of a textual price
pub const PRICE_CURRENCY_SYMBOLS: &[char] = &['$', '¥', '￥'];

// =============================================================================
// Order Text Parsing
// =============================================================================

/// Substrings marking a total line rather than an order item
pub const TOTAL_LINE_MARKERS: &[&str] = &["总价", "總價"];

/// Separator characters stripped from both ends of a parsed item name
pub const ITEM_NAME_STRIP_CHARS: &str = ",，、";

// =============================================================================
// Price Matching
// =============================================================================

/// Minimum similarity ratio accepted by the fuzzy tier
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.70;

/// Minimum shared whitespace tokens accepted by the keyword tier
pub const KEYWORD_MIN_SHARED_TOKENS: usize = 2;

/// Maximum suggestions reported for an unresolved item
pub const MAX_SUGGESTIONS: usize = 3;

/// Smallest price change recorded as a custom price
pub const PRICE_CHANGE_EPSILON: f64 = 0.001;

// =============================================================================
// Export Layout
// =============================================================================

/// Worksheet name of the exported workbook
pub const EXPORT_SHEET_NAME: &str = "Customer Orders";

/// Export header labels: sequence, customer, items detail, total, phone, address
pub const EXPORT_HEADERS: [&str; 6] = [
    "序号",
    "客户名称",
    "订购商品明细",
    "总价",
    "联系电话",
    "地址",
];

/// Export column widths in character units
pub const EXPORT_COLUMN_WIDTHS: [f64; 6] = [8.0, 15.0, 50.0, 12.0, 15.0, 30.0];

/// Header fill colour (RGB)
pub const EXPORT_HEADER_FILL: u32 = 0x366092;

/// Currency symbol used in formatted amounts
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// strftime pattern of the default export file name
pub const EXPORT_FILE_NAME_FORMAT: &str = "Customer_Orders_Export_%Y%m%d_%H%M%S.xlsx";

/// Timestamp format shown for last-modified overlays
pub const LAST_MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
