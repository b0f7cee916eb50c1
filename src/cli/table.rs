//! Table rendering for BOM output
//!
//! One [`BomTable`] can be written as an aligned terminal table, TSV, CSV or
//! JSON. Missing cells render as empty strings, except in JSON where they
//! are `null`.

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::bom::BomTable;
use crate::cli::FormatArg;

/// Render a table in the requested format
pub fn render(table: &BomTable, format: FormatArg) -> Result<String> {
    match format {
        FormatArg::Table => Ok(render_terminal(table)),
        FormatArg::Tsv => render_delimited(table, b'\t'),
        FormatArg::Csv => render_delimited(table, b','),
        FormatArg::Json => render_json(table),
    }
}

fn cells(row: &[Option<String>]) -> Vec<String> {
    row.iter().map(|c| c.clone().unwrap_or_default()).collect()
}

fn render_terminal(table: &BomTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.header.iter().cloned());
    for row in &table.rows {
        builder.push_record(cells(row));
    }
    builder.build().with(Style::rounded()).to_string()
}

fn render_delimited(table: &BomTable, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(if delimiter == b'\t' {
            csv::QuoteStyle::Never
        } else {
            csv::QuoteStyle::Necessary
        })
        .from_writer(Vec::new());
    writer.write_record(&table.header).into_diagnostic()?;
    for row in &table.rows {
        writer.write_record(cells(row)).into_diagnostic()?;
    }
    let bytes = writer.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

fn render_json(table: &BomTable) -> Result<String> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .header
                .iter()
                .zip(row)
                .map(|(name, cell)| {
                    let value = match cell {
                        Some(text) => serde_json::Value::String(text.clone()),
                        None => serde_json::Value::Null,
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .collect();
    serde_json::to_string_pretty(&records).into_diagnostic()
}
