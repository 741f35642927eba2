//! # tasador Matching
//!
//! The matching engine: given a priced reference table and a table of new
//! budget items, find the closest reference for every new item and copy its
//! price when the similarity clears the acceptance threshold.
//!
//! ## Strategies
//!
//! Two interchangeable [`SimilarityIndex`] implementations, selected through
//! [`MatchConfig::strategy`]:
//!
//! - **Lexical** ([`LexicalIndex`]) - token-sort ratio, scores 0–100
//! - **Semantic** ([`SemanticIndex`]) - sentence embeddings and exact
//!   inner-product search, scores -1–1
//!
//! The threshold is always read in the scale of the selected strategy.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tasador_core::{Row, Table, TableRole};
//! use tasador_matching::{AssignedPrice, EmbedderHandle, EmbedderKind, MatchConfig, PricingEngine, Strategy};
//!
//! let reference = Table::with_rows(
//!     TableRole::Reference,
//!     vec![
//!         Row::priced("P01", "Excavación", 120.0),
//!         Row::description("en terreno suelto"),
//!     ],
//! );
//! let query = Table::with_rows(
//!     TableRole::Query,
//!     vec![Row::item("N01", "Excavacion en terreno suelto")],
//! );
//!
//! let engine = PricingEngine::new(Arc::new(EmbedderHandle::for_kind(EmbedderKind::Hashing, 64)));
//! let report = engine
//!     .run(&reference, &query, &MatchConfig::new(Strategy::Lexical).with_threshold(80.0))
//!     .unwrap();
//! assert_eq!(report.items[0].assigned_price, AssignedPrice::Price(120.0));
//! ```
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Tables    │────>│ Reconstruct │────>│  Normalize  │
//! │ (two-row)   │     │   (items)   │     │   (text)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐    ┌──────┴──────┐
//!                      │  Resolver   │<───│    Index    │
//!                      │ (threshold) │    │ (reference) │
//!                      └─────────────┘    └─────────────┘
//! ```

pub mod embedder;
pub mod fuzz;
pub mod index;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod resolver;
pub mod strategy;

pub use embedder::{EmbedderHandle, EmbedderKind, HashingEmbedder, TextEmbedder, DEFAULT_HASHING_DIM, MINILM_DIM};
#[cfg(feature = "fastembed")]
pub use embedder::MiniLmEmbedder;
pub use index::{build_index, LexicalIndex, SemanticIndex, SimilarityIndex, TopMatch};
pub use pipeline::PricingEngine;
pub use reference::ReferenceSet;
pub use report::{PricedItem, PricingReport, PricingStats};
pub use resolver::{AssignedPrice, MatchSource, Resolution, Resolver, NOT_FOUND};
pub use strategy::{MatchConfig, Strategy, DEFAULT_EMBED_BATCH_SIZE};
