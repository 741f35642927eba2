//! # tasador Core
//!
//! Core library for tasador, the budget item pricing engine.
//!
//! This crate provides the data model and the pure transformations the
//! matching engine is built on:
//!
//! - [`Table`] / [`Row`] - flat tables handed over by the I/O layer
//! - [`reconstruct`] - rebuilds [`Item`]s from the two-row budget template
//! - [`normalize_text`] - canonical lowercase-ASCII comparison form
//! - [`Vector`] - dense embedding with SIMD dot products
//! - [`FlatIpIndex`] - exact inner-product nearest neighbour search
//!
//! ## Example
//!
//! ```rust
//! use tasador_core::{reconstruct, Row, Table, TableRole};
//!
//! let table = Table::with_rows(
//!     TableRole::Reference,
//!     vec![
//!         Row::priced("P01", "Excavación", 120.0),
//!         Row::description("en terreno suelto"),
//!     ],
//! );
//!
//! let items = reconstruct(&table).items;
//! assert_eq!(items[0].raw_text, "Excavación en terreno suelto");
//! assert_eq!(items[0].normalized_text, "excavacion en terreno suelto");
//! ```

pub mod error;
pub mod flat;
pub mod item;
pub mod normalize;
pub mod reconstruct;
pub mod table;
pub mod vector;

/// SIMD-optimized vector operations
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use error::{Error, Result};
pub use flat::FlatIpIndex;
pub use item::Item;
pub use normalize::{normalize_opt, normalize_text};
pub use reconstruct::{reconstruct, Reconstruction, RowDisposition};
pub use table::{Column, Row, Table, TableRole};
pub use vector::Vector;
