//! Flat tables handed over by the I/O layer.
//!
//! A table is an ordered list of rows following the two-row item convention:
//! a row carrying a code starts an item, the row right after it (without a
//! code) carries the item description.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical columns the matching engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Code,
    TitleText,
    Price,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::Code => "code",
            Column::TitleText => "title_text",
            Column::Price => "price",
        };
        f.write_str(name)
    }
}

/// Which side of the match a table feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    /// Price database of previously priced items
    Reference,
    /// New, unpriced budget items
    Query,
}

impl TableRole {
    /// Columns that must be present before any matching starts
    pub fn required_columns(self) -> &'static [Column] {
        match self {
            TableRole::Reference => &[Column::Code, Column::TitleText, Column::Price],
            TableRole::Query => &[Column::Code, Column::TitleText],
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Reference => f.write_str("reference"),
            TableRole::Query => f.write_str("query"),
        }
    }
}

/// One source row. `None` means the cell was empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title_text: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl Row {
    pub fn new(code: Option<&str>, title_text: Option<&str>, price: Option<f64>) -> Self {
        Self {
            code: code.map(str::to_string),
            title_text: title_text.map(str::to_string),
            price,
        }
    }

    /// A row that starts an item
    pub fn item(code: &str, title_text: &str) -> Self {
        Self::new(Some(code), Some(title_text), None)
    }

    /// A priced row that starts a reference item
    pub fn priced(code: &str, title_text: &str, price: f64) -> Self {
        Self::new(Some(code), Some(title_text), Some(price))
    }

    /// A code-less continuation row
    pub fn description(text: &str) -> Self {
        Self::new(None, Some(text), None)
    }

    #[inline]
    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }
}

/// Ordered rows plus the columns the I/O layer actually found
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    role: TableRole,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(role: TableRole, columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { role, columns, rows }
    }

    /// Table with every column its role requires
    pub fn with_rows(role: TableRole, rows: Vec<Row>) -> Self {
        Self::new(role, role.required_columns().to_vec(), rows)
    }

    pub fn role(&self) -> TableRole {
        self.role
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fails with the first required column that is missing
    pub fn validate(&self) -> Result<()> {
        match self
            .role
            .required_columns()
            .iter()
            .find(|column| !self.has_column(**column))
        {
            Some(column) => Err(Error::MissingColumn {
                table: self.role,
                column: *column,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_requires_price() {
        let table = Table::new(
            TableRole::Reference,
            vec![Column::Code, Column::TitleText],
            vec![Row::item("P01", "Excavación")],
        );
        match table.validate() {
            Err(Error::MissingColumn { table, column }) => {
                assert_eq!(table, TableRole::Reference);
                assert_eq!(column, Column::Price);
            }
            other => panic!("expected missing price column, got {:?}", other),
        }
    }

    #[test]
    fn test_query_does_not_require_price() {
        let table = Table::new(
            TableRole::Query,
            vec![Column::Code, Column::TitleText],
            Vec::new(),
        );
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_query_requires_text() {
        let table = Table::new(TableRole::Query, vec![Column::Code], Vec::new());
        assert!(matches!(
            table.validate(),
            Err(Error::MissingColumn { column: Column::TitleText, .. })
        ));
    }

    #[test]
    fn test_row_deserializes_with_missing_fields() {
        let row: Row = serde_json::from_str(r#"{"title_text": "en terreno suelto"}"#).unwrap();
        assert_eq!(row, Row::description("en terreno suelto"));
    }
}
