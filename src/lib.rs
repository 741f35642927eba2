//! # tasador
//!
//! Assigns reference prices to construction budget items ("partidas") by
//! matching them against a database of already priced items.
//!
//! Budget templates spread one item over two rows: a row with the item code
//! and title, then a code-less row with the long description. Both tables are
//! rebuilt into items, their text normalized, and every new item is matched
//! against the reference items with either a lexical (token-sort ratio) or a
//! semantic (sentence embedding) similarity. Matches at or above the threshold
//! take the reference price; the rest are marked `not found`.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! tasador price --reference base.xlsx --query nuevo.xlsx --output resultado.xlsx
//! tasador price --reference base.xlsx --query nuevo.xlsx --strategy semantic --threshold 0.75
//! tasador serve --port 8080
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use tasador::prelude::*;
//! use std::sync::Arc;
//!
//! let reference = Table::with_rows(
//!     TableRole::Reference,
//!     vec![
//!         Row::priced("E02", "Excavación en zanja", 18.4),
//!         Row::description("en terreno compacto, por medios mecánicos"),
//!     ],
//! );
//! let query = Table::with_rows(
//!     TableRole::Query,
//!     vec![
//!         Row::item("1.1", "EXCAVACION EN ZANJA"),
//!         Row::description("en terreno compacto, por medios mecanicos"),
//!     ],
//! );
//!
//! let engine = PricingEngine::new(Arc::new(EmbedderHandle::for_kind(EmbedderKind::Hashing, 128)));
//! let report = engine.run(&reference, &query, &MatchConfig::default()).unwrap();
//! assert_eq!(report.items[0].assigned_price, AssignedPrice::Price(18.4));
//! ```
//!
//! ## Crate Structure
//!
//! - `tasador-core` - tables, item reconstruction, text normalization, vector search
//! - `tasador-matching` - similarity strategies, resolver and the pricing pipeline
//! - `tasador-io` - spreadsheet reading and result workbook writing
//! - `tasador-api` - REST API
//!
//! ## Features
//!
//! - `fastembed` - the AllMiniLML6V2 sentence-embedding model for the semantic
//!   strategy. Without it only the hashing embedder is available.

// Re-export core types
pub use tasador_core::{
    normalize_text, reconstruct, Column, Error, FlatIpIndex, Item, Reconstruction, Result, Row, RowDisposition, Table,
    TableRole, Vector,
};

// Re-export matching
pub use tasador_matching::{
    AssignedPrice, EmbedderHandle, EmbedderKind, HashingEmbedder, MatchConfig, MatchSource, PricedItem, PricingEngine,
    PricingReport, PricingStats, Resolver, SimilarityIndex, Strategy, TextEmbedder, NOT_FOUND,
};

// Re-export I/O
pub use tasador_io::{read_table, write_report, IoError, SheetLayout};

// Re-export API
pub use tasador_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        normalize_text, read_table, write_report, AssignedPrice, EmbedderHandle, EmbedderKind, Error, Item, MatchConfig,
        PricedItem, PricingEngine, PricingReport, Result, Row, SheetLayout, Strategy, Table, TableRole, NOT_FOUND,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use tasador_core::simd::{dot_product_simd, norm_simd};
}
