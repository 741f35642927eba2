//! # tasador I/O
//!
//! Reads budget templates (`.xlsx`, `.xls`, `.ods`) into [`Table`]s and writes
//! the priced result workbook.
//!
//! A template carries banner rows above the header; the header row index is
//! part of the [`SheetLayout`] together with the names of the code, text and
//! price columns.
//!
//! [`Table`]: tasador_core::Table

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{IoError, Result};
pub use reader::{parse_price, read_table, table_from_grid, SheetLayout};
pub use writer::{report_to_bytes, write_report, RESULTS_SHEET, RESULT_HEADERS, SUMMARY_SHEET};
