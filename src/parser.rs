//! Free-text order parsing.
//!
//! Customers describe their orders as `item x qty` runs separated by
//! half-width, full-width or ideographic commas, e.g.
//! `苹果 x2，香蕉（大）x3、总价 x5`. Duplicated items stay separate lines;
//! merging is left to the caller.

use crate::config::ParserConfig;
use crate::models::OrderItem;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+?)x(\d+)(?:\s*[,，、]|$)").expect("item pattern is a valid regex")
});

/// Parser for `item x qty` order descriptions
#[derive(Debug, Clone)]
pub struct OrderTextParser {
    total_markers: Vec<String>,
    strip_chars: Vec<char>,
}

impl Default for OrderTextParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl OrderTextParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            total_markers: config.total_markers.clone(),
            strip_chars: config.strip_chars.chars().collect(),
        }
    }

    /// Parse a content string into order items, in order of appearance
    pub fn parse(&self, content: &str) -> Vec<OrderItem> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let mut items = Vec::new();
        for caps in ITEM_PATTERN.captures_iter(content) {
            let name = self.clean_name(&caps[1]);

            if self.is_total_line(name) {
                debug!("Skipping total line '{}'", name);
                continue;
            }
            if name.is_empty() {
                continue;
            }

            let Some(qty) = parse_quantity(&caps[2]) else {
                debug!("Dropping '{}': quantity '{}' does not fit u32", name, &caps[2]);
                continue;
            };

            items.push(OrderItem::new(name, qty));
        }
        items
    }

    /// Strip whitespace and separators from both ends, keeping interior punctuation
    fn clean_name<'a>(&self, raw: &'a str) -> &'a str {
        raw.trim_matches(|c: char| c.is_whitespace() || self.strip_chars.contains(&c))
    }

    fn is_total_line(&self, name: &str) -> bool {
        self.total_markers
            .iter()
            .any(|marker| name.contains(marker.as_str()))
    }
}

/// Decimal value of ASCII and full-width digits
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

/// Quantity from a run of digits; `None` on overflow or an unsupported digit
fn parse_quantity(digits: &str) -> Option<u32> {
    digits
        .chars()
        .try_fold(0u32, |qty, c| qty.checked_mul(10)?.checked_add(digit_value(c)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<OrderItem> {
        OrderTextParser::default().parse(content)
    }

    #[test]
    fn test_mixed_separators_and_total_line() {
        let items = parse("apple x2，banana x3，总价 x5");
        assert_eq!(
            items,
            vec![OrderItem::new("apple", 2), OrderItem::new("banana", 3)]
        );
    }

    #[test]
    fn test_half_width_and_ideographic_commas() {
        let items = parse("牛奶 x1, 面包 x4、鸡蛋x12");
        assert_eq!(
            items,
            vec![
                OrderItem::new("牛奶", 1),
                OrderItem::new("面包", 4),
                OrderItem::new("鸡蛋", 12),
            ]
        );
    }

    #[test]
    fn test_content_punctuation_is_kept() {
        let items = parse("有机红苹果（大）x2，橙汁(1L) x1");
        assert_eq!(items[0].name, "有机红苹果（大）");
        assert_eq!(items[1].name, "橙汁(1L)");
    }

    #[test]
    fn test_traditional_total_marker_rejected() {
        let items = parse("茶叶 x1，總價 x30");
        assert_eq!(items, vec![OrderItem::new("茶叶", 1)]);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let items = parse("apple x1，apple x2");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], OrderItem::new("apple", 1));
        assert_eq!(items[1], OrderItem::new("apple", 2));
    }

    #[test]
    fn test_full_width_quantity() {
        let items = parse("苹果 x２，香蕉 x3，橙子 x１２");
        assert_eq!(
            items,
            vec![
                OrderItem::new("苹果", 2),
                OrderItem::new("香蕉", 3),
                OrderItem::new("橙子", 12),
            ]
        );
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("007"), Some(7));
        assert_eq!(parse_quantity("１0"), Some(10));
        assert_eq!(parse_quantity("4294967295"), Some(u32::MAX));
        assert_eq!(parse_quantity("4294967296"), None);
        // Arabic-Indic digits are matched by \d but not supported
        assert_eq!(parse_quantity("٣"), None);
    }

    #[test]
    fn test_overflowing_quantity_dropped() {
        let items = parse("apple x99999999999999999999，pear x1");
        assert_eq!(items, vec![OrderItem::new("pear", 1)]);
    }

    #[test]
    fn test_empty_and_unmatched_content() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
        assert!(parse("just a note, nothing ordered").is_empty());
    }

    #[test]
    fn test_separator_only_name_rejected() {
        let items = parse("，x3，pear x1");
        assert_eq!(items, vec![OrderItem::new("pear", 1)]);
    }

    #[test]
    fn test_name_containing_x() {
        let items = parse("Box x2");
        assert_eq!(items, vec![OrderItem::new("Box", 2)]);
    }
}
