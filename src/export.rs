//! Table export.
//!
//! An [`ExportSink`] writes one [`ExportTable`] to one file. Empty tables are
//! never written. CSV output has the header row first and the summary row
//! last; JSON output keeps the summary row in its own field so consumers do
//! not have to guess which row is the total.

use crate::report::ExportTable;
use clap::ValueEnum;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV to {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write JSON to {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read CSV from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// The table had no rows; nothing was written.
    Skipped,
}

pub trait ExportSink {
    /// File extension, without the dot, of what this sink writes.
    fn extension(&self) -> &'static str;

    fn write_table(&self, table: &ExportTable, destination: &Path) -> Result<ExportOutcome, ExportError>;
}

/// Comma-separated values with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSink;

/// A JSON document `{"columns": [...], "rows": [{...}], "summary": {...}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl ExportSink for CsvSink {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_table(&self, table: &ExportTable, destination: &Path) -> Result<ExportOutcome, ExportError> {
        if table.is_empty() {
            warn!(path = %destination.display(), "No data to write");
            return Ok(ExportOutcome::Skipped);
        }

        let file = create(destination)?;
        write_csv(table, file).map_err(|source| ExportError::Csv {
            path: destination.to_path_buf(),
            source,
        })?;

        info!(path = %destination.display(), "Data successfully written");
        Ok(ExportOutcome::Written {
            path: destination.to_path_buf(),
            rows: table.all_rows().count(),
        })
    }
}

impl ExportSink for JsonSink {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_table(&self, table: &ExportTable, destination: &Path) -> Result<ExportOutcome, ExportError> {
        if table.is_empty() {
            warn!(path = %destination.display(), "No data to write");
            return Ok(ExportOutcome::Skipped);
        }

        let file = create(destination)?;
        write_json(table, file).map_err(|source| ExportError::Json {
            path: destination.to_path_buf(),
            source,
        })?;

        info!(path = %destination.display(), "Data successfully written");
        Ok(ExportOutcome::Written {
            path: destination.to_path_buf(),
            rows: table.all_rows().count(),
        })
    }
}

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportSink for ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Csv => CsvSink.extension(),
            Self::Json => JsonSink.extension(),
        }
    }

    fn write_table(&self, table: &ExportTable, destination: &Path) -> Result<ExportOutcome, ExportError> {
        match self {
            Self::Csv => CsvSink.write_table(table, destination),
            Self::Json => JsonSink.write_table(table, destination),
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `table` as CSV to any writer, header first.
pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&table.headers)?;
    for row in table.all_rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `table` as pretty JSON to any writer.
pub fn write_json<W: Write>(table: &ExportTable, writer: W) -> Result<(), serde_json::Error> {
    let object = |cells: &Vec<String>| -> Value {
        let map: Map<String, Value> = table
            .headers
            .iter()
            .zip(cells)
            .map(|(header, cell)| (header.clone(), Value::String(cell.clone())))
            .collect();
        Value::Object(map)
    };

    let document = json!({
        "columns": table.headers,
        "rows": table.rows.iter().map(object).collect::<Vec<_>>(),
        "summary": table.summary.as_ref().map(object),
    });
    serde_json::to_writer_pretty(writer, &document)
}

/// A CSV file read back as header and rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_table(path: &Path) -> Result<CsvTable, ExportError> {
    let read_err = |source: csv::Error| ExportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    let headers = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}
