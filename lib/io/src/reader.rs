//! Budget template reader
//!
//! Templates have a few banner rows, a header row, then the item rows. Only
//! the code, text and price columns are read; everything else is ignored.

use crate::error::{IoError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tasador_core::{normalize_text, Column, Row, Table, TableRole};
use tracing::debug;

/// Where the columns of a budget template are
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Sheet name; the first sheet when absent
    #[serde(default)]
    pub sheet: Option<String>,
    /// 0-based sheet row holding the column headers
    pub header_row: usize,
    pub code_column: String,
    pub text_column: String,
    pub price_column: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet: None,
            header_row: 2,
            code_column: "Código".to_string(),
            text_column: "Resumen".to_string(),
            price_column: "Pres".to_string(),
        }
    }
}

/// Read one template sheet into a table and check it has the columns its
/// role needs.
pub fn read_table<P: AsRef<Path>>(path: P, role: TableRole, layout: &SheetLayout) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names().to_owned();
    let sheet = match &layout.sheet {
        Some(wanted) => names
            .iter()
            .find(|name| *name == wanted)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound(wanted.clone()))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound(path.display().to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let grid: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if grid.is_empty() {
        return Err(IoError::EmptySheet(sheet));
    }

    let table = table_from_grid(&grid, first_row, role, layout)?;
    debug!(
        path = %path.display(),
        sheet = %sheet,
        table = %role,
        rows = table.len(),
        "Read budget sheet"
    );
    Ok(table)
}

/// Build a table from sheet cells. `first_row` is the sheet row of `grid[0]`.
pub fn table_from_grid(grid: &[Vec<Data>], first_row: usize, role: TableRole, layout: &SheetLayout) -> Result<Table> {
    let last_row = first_row + grid.len().saturating_sub(1);
    let header_at = layout
        .header_row
        .checked_sub(first_row)
        .filter(|offset| *offset < grid.len())
        .ok_or(IoError::HeaderRowOutOfRange {
            row: layout.header_row,
            first: first_row,
            last: last_row,
        })?;

    let header = &grid[header_at];
    let code_idx = find_column(header, &layout.code_column);
    let text_idx = find_column(header, &layout.text_column);
    let price_idx = match role {
        TableRole::Reference => find_column(header, &layout.price_column),
        TableRole::Query => None,
    };

    let columns: Vec<Column> = [
        (Column::Code, code_idx),
        (Column::TitleText, text_idx),
        (Column::Price, price_idx),
    ]
    .into_iter()
    .filter_map(|(column, idx)| idx.map(|_| column))
    .collect();

    let rows: Vec<Row> = grid[header_at + 1..]
        .iter()
        .map(|cells| Row {
            code: code_idx.and_then(|i| cells.get(i)).and_then(cell_to_text),
            title_text: text_idx.and_then(|i| cells.get(i)).and_then(cell_to_text),
            price: price_idx.and_then(|i| cells.get(i)).and_then(cell_to_price),
        })
        .collect();

    let table = Table::new(role, columns, rows);
    table.validate()?;
    Ok(table)
}

/// Header comparison ignores case, accents and spacing
pub fn normalize_header(s: &str) -> String {
    normalize_text(s).replace(' ', "")
}

fn find_column(header: &[Data], name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    header
        .iter()
        .position(|cell| cell_to_text(cell).map(|h| normalize_header(&h)) == Some(wanted.clone()))
}

/// Cell as text; `None` for empty cells, errors and blank strings
pub fn cell_to_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Numeric cell, or a string holding a number
pub fn cell_to_price(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_price(s),
        _ => None,
    }
}

/// Parse "1.234,56", "1,234.56", "12,5 €" and plain numbers.
///
/// Budget sheets use the Spanish convention: with both separators the
/// rightmost one is the decimal mark, a lone `,` is decimal, and a `.`
/// followed by exactly three digits (or repeated) groups thousands, so
/// "1.234" is 1234 and "1.5" is 1.5.
pub fn parse_price(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .collect();

    let canonical = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches(',').count() > 1 => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        (Some(dot), None) if groups_thousands(&cleaned, dot) => cleaned.replace('.', ""),
        _ => cleaned,
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn groups_thousands(cleaned: &str, last_dot: usize) -> bool {
    let tail = &cleaned[last_dot + 1..];
    cleaned.matches('.').count() > 1 || (tail.len() == 3 && tail.bytes().all(|b| b.is_ascii_digit()) && last_dot > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasador_core::Error;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn template() -> Vec<Vec<Data>> {
        vec![
            vec![s("Presupuesto"), Data::Empty, Data::Empty],
            vec![Data::Empty, Data::Empty, Data::Empty],
            vec![s("CÓDIGO "), s("resumen"), s("Pres")],
            vec![s("P01"), s("Excavación"), Data::Float(120.0)],
            vec![Data::Empty, s("en terreno suelto"), Data::Empty],
            vec![Data::Float(2.0), s("Muro"), s("45,50")],
        ]
    }

    #[test]
    fn test_reads_template_rows() {
        let table = table_from_grid(&template(), 0, TableRole::Reference, &SheetLayout::default()).unwrap();
        assert_eq!(table.columns(), &[Column::Code, Column::TitleText, Column::Price]);
        assert_eq!(
            table.rows(),
            &[
                Row::priced("P01", "Excavación", 120.0),
                Row::description("en terreno suelto"),
                Row::priced("2", "Muro", 45.5),
            ]
        );
    }

    #[test]
    fn test_query_ignores_price() {
        let table = table_from_grid(&template(), 0, TableRole::Query, &SheetLayout::default()).unwrap();
        assert!(!table.has_column(Column::Price));
        assert!(table.rows().iter().all(|r| r.price.is_none()));
    }

    #[test]
    fn test_missing_price_header() {
        let mut grid = template();
        grid[2][2] = s("Importe");
        let err = table_from_grid(&grid, 0, TableRole::Reference, &SheetLayout::default()).unwrap_err();
        assert!(matches!(
            err,
            IoError::Core(Error::MissingColumn { column: Column::Price, .. })
        ));
    }

    #[test]
    fn test_range_offset_is_honoured() {
        // the used range starts at sheet row 2, so the header is grid[0]
        let grid = template()[2..].to_vec();
        let table = table_from_grid(&grid, 2, TableRole::Reference, &SheetLayout::default()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_header_out_of_range() {
        let layout = SheetLayout {
            header_row: 40,
            ..SheetLayout::default()
        };
        assert!(matches!(
            table_from_grid(&template(), 0, TableRole::Query, &layout),
            Err(IoError::HeaderRowOutOfRange { row: 40, first: 0, last: 5 })
        ));

        let grid = template()[3..].to_vec();
        assert!(matches!(
            table_from_grid(&grid, 3, TableRole::Query, &SheetLayout::default()),
            Err(IoError::HeaderRowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_cell_to_text() {
        assert_eq!(cell_to_text(&s("  ")), None);
        assert_eq!(cell_to_text(&Data::Empty), None);
        assert_eq!(cell_to_text(&Data::Float(3.0)).as_deref(), Some("3"));
        assert_eq!(cell_to_text(&Data::Float(3.25)).as_deref(), Some("3.25"));
        assert_eq!(cell_to_text(&s(" P01 ")).as_deref(), Some("P01"));
    }

    #[test]
    fn test_parse_price_dot_thousands() {
        assert_eq!(parse_price("1.234"), Some(1234.0));
        assert_eq!(parse_price("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_price("1.234 €"), Some(1234.0));
        assert_eq!(parse_price("1,234,567"), Some(1_234_567.0));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("120"), Some(120.0));
        assert_eq!(parse_price("45,50"), Some(45.5));
        assert_eq!(parse_price("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_price("1,234.56"), Some(1234.56));
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("1.5"), Some(1.5));
        assert_eq!(parse_price("12.50"), Some(12.5));
        assert_eq!(parse_price(""), None);
    }
}
