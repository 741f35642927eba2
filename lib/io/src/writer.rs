//! Result workbook writer

use crate::error::Result;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tasador_matching::{AssignedPrice, PricingReport, NOT_FOUND};
use tracing::info;

pub const RESULTS_SHEET: &str = "Resultados";
pub const SUMMARY_SHEET: &str = "Resumen";

pub const RESULT_HEADERS: [&str; 6] = [
    "Código",
    "Texto_completo",
    "Texto_normalizado",
    "Coincidencia",
    "Puntuación",
    "Precio Asignado",
];

/// Write `report` as an `.xlsx` workbook at `path`
pub fn write_report<P: AsRef<Path>>(path: P, report: &PricingReport) -> Result<()> {
    let path = path.as_ref();
    let mut workbook = build_workbook(report)?;
    workbook.save(path)?;
    info!(path = %path.display(), items = report.items.len(), "Wrote result workbook");
    Ok(())
}

/// Serialize `report` to `.xlsx` bytes
pub fn report_to_bytes(report: &PricingReport) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(report)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(report: &PricingReport) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let score_format = Format::new().set_num_format("0.000");
    let price_format = Format::new().set_num_format("#,##0.00");

    let results = workbook.add_worksheet();
    results.set_name(RESULTS_SHEET)?;
    write_header(results, &RESULT_HEADERS, &header_format)?;

    for (i, item) in report.items.iter().enumerate() {
        let row = (i + 1) as u32;
        results.write_string(row, 0, &item.code)?;
        results.write_string(row, 1, &item.raw_text)?;
        results.write_string(row, 2, &item.normalized_text)?;
        results.write_string(row, 3, item.matched_text.as_deref().unwrap_or(""))?;
        results.write_number_with_format(row, 4, item.score, &score_format)?;
        match item.assigned_price {
            AssignedPrice::Price(price) => {
                results.write_number_with_format(row, 5, price, &price_format)?;
            }
            AssignedPrice::NotFound => {
                results.write_string(row, 5, NOT_FOUND)?;
            }
        }
    }
    results.set_column_width(1, 50)?;
    results.set_column_width(2, 50)?;
    results.set_column_width(3, 50)?;

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    write_header(summary, &["Campo", "Valor"], &header_format)?;

    let stats = &report.stats;
    let rows: [(&str, f64); 8] = [
        ("Umbral", report.threshold),
        ("Partidas de referencia", stats.reference_items as f64),
        ("Partidas a tasar", stats.query_items as f64),
        ("Tasadas", stats.matched as f64),
        ("Sin coincidencia", stats.not_found as f64),
        ("Por código", stats.code_matches as f64),
        ("Puntuación media", stats.avg_score),
        ("Tasa de acierto", stats.match_rate()),
    ];
    summary.write_string(1, 0, "Estrategia")?;
    summary.write_string(1, 1, report.strategy.to_string())?;
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        summary.write_string(row, 0, *label)?;
        summary.write_number(row, 1, *value)?;
    }
    summary.set_column_width(0, 26)?;

    Ok(workbook)
}

fn write_header(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}
