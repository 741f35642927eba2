use crate::table::{Column, TableRole};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required column in {table} table: {column}")]
    MissingColumn { table: TableRole, column: Column },

    #[error("Reference table has no usable items (an item needs a price and a non-empty description)")]
    EmptyReferenceSet,

    #[error("Unknown similarity strategy: {0}")]
    UnknownStrategy(String),

    #[error("Threshold {value} is outside the {strategy} range [{min}, {max}]")]
    InvalidThreshold {
        strategy: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Configuration errors abort a run before any matching happens.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::Embedding(_) | Error::InvalidDimension { .. })
    }
}
