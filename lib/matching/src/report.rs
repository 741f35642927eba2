//! Output structures handed to renderers (spreadsheet writer, JSON API)

use crate::resolver::{AssignedPrice, MatchSource, Resolution};
use crate::strategy::Strategy;
use serde::Serialize;
use tasador_core::Item;

/// A query item annotated with its resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedItem {
    pub code: String,
    pub raw_text: String,
    pub normalized_text: String,
    pub matched_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_code: Option<String>,
    pub score: f64,
    pub assigned_price: AssignedPrice,
    pub source: MatchSource,
}

impl PricedItem {
    pub fn new(item: Item, resolution: Resolution) -> Self {
        Self {
            code: item.code,
            raw_text: item.raw_text,
            normalized_text: item.normalized_text,
            matched_text: resolution.matched_text,
            matched_code: resolution.matched_code,
            score: resolution.score,
            assigned_price: resolution.assigned_price,
            source: resolution.source,
        }
    }
}

/// Summary statistics for one pricing run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingStats {
    /// Reference items that entered the index
    pub reference_items: usize,
    pub query_items: usize,
    pub matched: usize,
    pub not_found: usize,
    /// Matched through an identical code instead of text similarity
    pub code_matches: usize,
    /// Mean score of accepted matches
    pub avg_score: f64,
    pub best_accepted_score: Option<f64>,
    pub worst_accepted_score: Option<f64>,
    /// Source rows that belonged to no item, per table
    pub skipped_reference_rows: usize,
    pub skipped_query_rows: usize,
}

impl PricingStats {
    pub fn compute(
        items: &[PricedItem],
        reference_items: usize,
        skipped_reference_rows: usize,
        skipped_query_rows: usize,
    ) -> Self {
        let accepted: Vec<f64> = items
            .iter()
            .filter(|i| i.assigned_price.is_found())
            .map(|i| i.score)
            .collect();

        let avg_score = if accepted.is_empty() {
            0.0
        } else {
            accepted.iter().sum::<f64>() / accepted.len() as f64
        };

        Self {
            reference_items,
            query_items: items.len(),
            matched: accepted.len(),
            not_found: items.len() - accepted.len(),
            code_matches: items.iter().filter(|i| i.source == MatchSource::Code).count(),
            avg_score,
            best_accepted_score: accepted.iter().copied().reduce(f64::max),
            worst_accepted_score: accepted.iter().copied().reduce(f64::min),
            skipped_reference_rows,
            skipped_query_rows,
        }
    }

    /// Share of query items that received a price, 0–1
    pub fn match_rate(&self) -> f64 {
        if self.query_items == 0 {
            0.0
        } else {
            self.matched as f64 / self.query_items as f64
        }
    }
}

/// Everything a pricing run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingReport {
    pub strategy: Strategy,
    /// Threshold in the strategy's native scale
    pub threshold: f64,
    pub items: Vec<PricedItem>,
    pub stats: PricingStats,
}

impl PricingReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(score: f64, price: Option<f64>, source: MatchSource) -> PricedItem {
        PricedItem {
            code: "X".to_string(),
            raw_text: String::new(),
            normalized_text: String::new(),
            matched_text: None,
            matched_code: None,
            score,
            assigned_price: price.map(AssignedPrice::Price).unwrap_or(AssignedPrice::NotFound),
            source,
        }
    }

    #[test]
    fn test_stats() {
        let items = vec![
            priced(90.0, Some(10.0), MatchSource::Similarity),
            priced(100.0, Some(20.0), MatchSource::Code),
            priced(40.0, None, MatchSource::Similarity),
        ];
        let stats = PricingStats::compute(&items, 7, 1, 2);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.code_matches, 1);
        assert!((stats.avg_score - 95.0).abs() < 1e-9);
        assert_eq!(stats.best_accepted_score, Some(100.0));
        assert_eq!(stats.worst_accepted_score, Some(90.0));
        assert!((stats.match_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_without_items() {
        let stats = PricingStats::compute(&[], 3, 0, 0);
        assert_eq!(stats.avg_score, 0.0);
        assert_eq!(stats.best_accepted_score, None);
        assert_eq!(stats.match_rate(), 0.0);
    }

    #[test]
    fn test_misses_do_not_count_as_best_score() {
        let items = vec![
            priced(75.0, None, MatchSource::Similarity),
            priced(60.0, None, MatchSource::Similarity),
        ];
        let stats = PricingStats::compute(&items, 2, 0, 0);
        assert_eq!(stats.best_accepted_score, None);
        assert_eq!(stats.worst_accepted_score, None);
        assert_eq!(stats.not_found, 2);
    }
}
