//! End-to-end pricing run: tables in, annotated query items out

use crate::embedder::EmbedderHandle;
use crate::index::build_index;
use crate::reference::ReferenceSet;
use crate::report::{PricedItem, PricingReport, PricingStats};
use crate::resolver::Resolver;
use crate::strategy::MatchConfig;
use std::sync::Arc;
use std::time::Instant;
use tasador_core::{reconstruct, Error, Result, Table, TableRole};
use tracing::info;

/// Runs the matching pipeline.
///
/// Holds the embedder handle so repeated runs reuse a loaded model; every
/// run builds its own index and drops it at the end.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    embedder: Arc<EmbedderHandle>,
}

impl PricingEngine {
    pub fn new(embedder: Arc<EmbedderHandle>) -> Self {
        Self { embedder }
    }

    pub fn embedder(&self) -> &EmbedderHandle {
        &self.embedder
    }

    /// Price every item of `query` against `reference`.
    ///
    /// Configuration problems (missing columns, no usable reference item,
    /// bad threshold) fail before any matching starts.
    pub fn run(&self, reference: &Table, query: &Table, config: &MatchConfig) -> Result<PricingReport> {
        let started = Instant::now();

        config.validate()?;
        check_role(reference, TableRole::Reference)?;
        check_role(query, TableRole::Query)?;
        reference.validate()?;
        query.validate()?;

        let reference_rec = reconstruct(reference);
        let query_rec = reconstruct(query);
        let skipped_reference_rows = reference_rec.skipped_rows();
        let skipped_query_rows = query_rec.skipped_rows();

        let reference_set = ReferenceSet::from_items(reference_rec.items)?;
        let query_items = query_rec.items;

        info!(
            strategy = %config.strategy,
            threshold = config.threshold,
            references = reference_set.len(),
            queries = query_items.len(),
            "Building similarity index"
        );
        let index = build_index(config, &reference_set.texts(), &self.embedder)?;

        let resolutions = Resolver::new(&reference_set, index.as_ref(), config).resolve_all(&query_items)?;

        let items: Vec<PricedItem> = query_items
            .into_iter()
            .zip(resolutions)
            .map(|(item, resolution)| PricedItem::new(item, resolution))
            .collect();
        let stats = PricingStats::compute(&items, reference_set.len(), skipped_reference_rows, skipped_query_rows);

        info!(
            matched = stats.matched,
            not_found = stats.not_found,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pricing run finished"
        );

        Ok(PricingReport {
            strategy: config.strategy,
            threshold: config.threshold,
            items,
            stats,
        })
    }
}

fn check_role(table: &Table, expected: TableRole) -> Result<()> {
    if table.role() != expected {
        return Err(Error::InvalidConfig(format!(
            "expected a {} table, got a {} table",
            expected,
            table.role()
        )));
    }
    Ok(())
}
