//! Item price resolution.
//!
//! An item name is priced by the first tier that hits:
//! customer override, exact catalog key, fuzzy similarity, shared keywords.
//! Items that survive all tiers are priced at 0.0 and can be explained with
//! [`PriceResolver::diagnose`].

use crate::config::MatchingConfig;
use crate::matching::{shared_token_count, similarity_ratio};
use crate::models::{Catalog, MatchTier};
use serde::Serialize;
use std::collections::HashMap;

/// Strength of a fuzzy or keyword match
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MatchScore {
    Similarity(f64),
    SharedTokens(usize),
}

/// A catalog entry offered as a correction for an unresolved item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub price: f64,
    pub shared_tokens: usize,
}

/// Full account of how an item was priced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceResolution {
    pub item: String,
    pub price: f64,
    pub tier: MatchTier,
    /// Catalog key that supplied the price (exact, fuzzy and keyword tiers)
    pub matched_key: Option<String>,
    pub score: Option<MatchScore>,
    /// Catalog entries sharing a token with the item, only for unresolved items
    pub suggestions: Vec<Suggestion>,
}

impl PriceResolution {
    fn hit(item: &str, price: f64, tier: MatchTier) -> Self {
        Self {
            item: item.to_string(),
            price,
            tier,
            matched_key: None,
            score: None,
            suggestions: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tier != MatchTier::Unresolved
    }
}

/// Resolves item names to unit prices against one catalog
#[derive(Debug, Clone, Copy)]
pub struct PriceResolver<'a> {
    catalog: &'a Catalog,
    config: &'a MatchingConfig,
}

impl<'a> PriceResolver<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a MatchingConfig) -> Self {
        Self { catalog, config }
    }

    /// Unit price of `item`, consulting `overrides` (a customer's custom prices) first
    pub fn resolve(&self, overrides: Option<&HashMap<String, f64>>, item: &str) -> f64 {
        self.resolve_with_tier(overrides, item).0
    }

    /// Unit price and the tier that produced it
    pub fn resolve_with_tier(
        &self,
        overrides: Option<&HashMap<String, f64>>,
        item: &str,
    ) -> (f64, MatchTier) {
        if let Some(&price) = overrides.and_then(|prices| prices.get(item)) {
            return (price, MatchTier::Override);
        }
        if let Some(price) = self.catalog.price(item) {
            return (price, MatchTier::Exact);
        }
        if let Some((_, price, _)) = self.fuzzy_match(item) {
            return (price, MatchTier::Fuzzy);
        }
        if let Some((_, price, _)) = self.keyword_match(item) {
            return (price, MatchTier::Keyword);
        }
        (0.0, MatchTier::Unresolved)
    }

    /// Like [`resolve`](Self::resolve), also reporting the matched key, score and suggestions
    pub fn diagnose(
        &self,
        overrides: Option<&HashMap<String, f64>>,
        item: &str,
    ) -> PriceResolution {
        if let Some(&price) = overrides.and_then(|prices| prices.get(item)) {
            return PriceResolution::hit(item, price, MatchTier::Override);
        }
        if let Some(price) = self.catalog.price(item) {
            return PriceResolution {
                matched_key: Some(item.to_string()),
                ..PriceResolution::hit(item, price, MatchTier::Exact)
            };
        }
        if let Some((key, price, ratio)) = self.fuzzy_match(item) {
            return PriceResolution {
                matched_key: Some(key.to_string()),
                score: Some(MatchScore::Similarity(ratio)),
                ..PriceResolution::hit(item, price, MatchTier::Fuzzy)
            };
        }
        if let Some((key, price, shared)) = self.keyword_match(item) {
            return PriceResolution {
                matched_key: Some(key.to_string()),
                score: Some(MatchScore::SharedTokens(shared)),
                ..PriceResolution::hit(item, price, MatchTier::Keyword)
            };
        }

        PriceResolution {
            suggestions: self.suggestions(item),
            ..PriceResolution::hit(item, 0.0, MatchTier::Unresolved)
        }
    }

    /// Best-scoring catalog key if its similarity reaches the threshold
    fn fuzzy_match(&self, item: &str) -> Option<(&'a str, f64, f64)> {
        let catalog: &'a Catalog = self.catalog;
        let mut best: Option<(&'a str, f64, f64)> = None;
        for entry in catalog.iter() {
            let ratio = similarity_ratio(item, &entry.name);
            if best.is_none_or(|(_, _, best_ratio)| ratio > best_ratio) {
                best = Some((&entry.name, entry.price, ratio));
            }
        }
        best.filter(|&(_, _, ratio)| ratio >= self.config.fuzzy_threshold)
    }

    /// Catalog key sharing the most whitespace tokens, if it shares enough
    fn keyword_match(&self, item: &str) -> Option<(&'a str, f64, usize)> {
        let catalog: &'a Catalog = self.catalog;
        let mut best: Option<(&'a str, f64, usize)> = None;
        for entry in catalog.iter() {
            let shared = shared_token_count(item, &entry.name);
            if best.is_none_or(|(_, _, best_shared)| shared > best_shared) {
                best = Some((&entry.name, entry.price, shared));
            }
        }
        best.filter(|&(_, _, shared)| shared >= self.config.keyword_min_shared)
    }

    /// Catalog entries sharing at least one token, most shared first
    fn suggestions(&self, item: &str) -> Vec<Suggestion> {
        let mut candidates: Vec<Suggestion> = self
            .catalog
            .iter()
            .filter_map(|entry| {
                let shared = shared_token_count(item, &entry.name);
                (shared > 0).then(|| Suggestion {
                    name: entry.name.clone(),
                    price: entry.price,
                    shared_tokens: shared,
                })
            })
            .collect();

        // Stable sort keeps catalog order among equal counts
        candidates.sort_by(|a, b| b.shared_tokens.cmp(&a.shared_tokens));
        candidates.truncate(self.config.max_suggestions);
        candidates
    }
}
