//! Item reconstruction from the two-row template
//!
//! The cursor pass is sequential: whether a code-less row is a description
//! depends on the row right before it. It is written as an explicit state
//! machine so every row ends up with exactly one [`RowDisposition`].
//! Normalization of the finished items runs in parallel afterwards.

use crate::item::{combine_text, Item};
use crate::table::{Column, Row, Table, TableRole};
use ahash::AHashSet;
use rayon::prelude::*;
use tracing::{debug, warn};

/// What the scan did with a source row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    /// Row carries a code and starts item number `item`
    ItemStart { item: usize },
    /// Row was consumed as the description of item number `item`
    Description { item: usize },
    /// Code-less row not following a code row; belongs to no item
    Skipped,
}

/// Items in source order plus one disposition per input row
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub items: Vec<Item>,
    pub dispositions: Vec<RowDisposition>,
}

impl Reconstruction {
    pub fn skipped_rows(&self) -> usize {
        self.dispositions
            .iter()
            .filter(|d| matches!(d, RowDisposition::Skipped))
            .count()
    }
}

/// Item whose description row has not been seen yet
struct PendingItem {
    code: String,
    title: String,
    price: Option<f64>,
}

impl PendingItem {
    fn finish(self, description: &str) -> (String, String, Option<f64>) {
        (self.code, combine_text(&self.title, description), self.price)
    }
}

enum ScanState {
    ExpectItemStart,
    ItemStarted(PendingItem),
}

/// Rebuild items from a table.
///
/// Prices are read only for reference tables that have a price column;
/// query items always start unpriced.
pub fn reconstruct(table: &Table) -> Reconstruction {
    let keep_price = table.role() == TableRole::Reference && table.has_column(Column::Price);
    let rows = table.rows();

    let mut finished: Vec<(String, String, Option<f64>)> = Vec::new();
    let mut dispositions = Vec::with_capacity(rows.len());
    let mut state = ScanState::ExpectItemStart;

    for row in rows {
        state = match state {
            ScanState::ExpectItemStart => start_or_skip(row, keep_price, finished.len(), &mut dispositions),
            ScanState::ItemStarted(pending) => {
                if row.has_code() {
                    finished.push(pending.finish(""));
                    start_or_skip(row, keep_price, finished.len(), &mut dispositions)
                } else {
                    dispositions.push(RowDisposition::Description { item: finished.len() });
                    finished.push(pending.finish(row.title_text.as_deref().unwrap_or("")));
                    ScanState::ExpectItemStart
                }
            }
        };
    }

    if let ScanState::ItemStarted(pending) = state {
        finished.push(pending.finish(""));
    }

    let items: Vec<Item> = finished
        .into_par_iter()
        .map(|(code, raw_text, price)| Item::new(code, raw_text, price))
        .collect();

    warn_duplicate_codes(table.role(), &items);

    let reconstruction = Reconstruction { items, dispositions };
    debug!(
        table = %table.role(),
        rows = rows.len(),
        items = reconstruction.items.len(),
        skipped = reconstruction.skipped_rows(),
        "Reconstructed items"
    );
    reconstruction
}

fn start_or_skip(
    row: &Row,
    keep_price: bool,
    next_item: usize,
    dispositions: &mut Vec<RowDisposition>,
) -> ScanState {
    match &row.code {
        Some(code) => {
            dispositions.push(RowDisposition::ItemStart { item: next_item });
            ScanState::ItemStarted(PendingItem {
                code: code.clone(),
                title: row.title_text.clone().unwrap_or_default(),
                price: if keep_price { row.price } else { None },
            })
        }
        None => {
            dispositions.push(RowDisposition::Skipped);
            ScanState::ExpectItemStart
        }
    }
}

fn warn_duplicate_codes(role: TableRole, items: &[Item]) {
    let mut seen = AHashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.code.as_str()) {
            warn!(table = %role, code = %item.code, "Duplicate item code");
        }
    }
}
