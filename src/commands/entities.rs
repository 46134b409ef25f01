//! List customer entities.
//!
//! Fetches every entity from the administration API, drops internal and test
//! entities, and writes the rest with a trailing total row.
//!
//! # Usage
//!
//! ```bash
//! # Print as CSV
//! lr-report entities
//!
//! # Write JSON to a file
//! lr-report entities --format json --output entities.json
//! ```

use super::{connect, print_connection};
use crate::config::ApiOptions;
use crate::export::{write_csv, write_json, ExportFormat};
use crate::report::normalize::{entities_table, normalize_entities};
use crate::utils::format::format_number;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};

pub async fn run(options: &ApiOptions, output: Option<&str>, format: ExportFormat) -> Result<()> {
    let (config, api) = connect(options)?;

    eprintln!("=== Entity List ===");
    print_connection(&config);

    eprintln!("Fetching entities...");
    let items = api.fetch_entities().await.context("Failed to fetch entities")?;
    let entities = normalize_entities(&items);
    eprintln!(
        "Found {} customer entities ({} total)",
        format_number(entities.len() as u64),
        format_number(items.len() as u64)
    );

    let table = entities_table(entities).to_export();
    if table.is_empty() {
        eprintln!("No entities to write");
        return Ok(());
    }

    match output {
        Some(output_path) => {
            let file = File::create(output_path)
                .with_context(|| format!("Failed to create output file: {}", output_path))?;
            let writer = BufWriter::new(file);
            match format {
                ExportFormat::Csv => write_csv(&table, writer)
                    .with_context(|| format!("Failed to write CSV to: {}", output_path))?,
                ExportFormat::Json => write_json(&table, writer)
                    .with_context(|| format!("Failed to write JSON to: {}", output_path))?,
            }
            eprintln!("Entities written to: {}", output_path);
        }
        None => match format {
            ExportFormat::Csv => write_csv(&table, io::stdout().lock())?,
            ExportFormat::Json => {
                write_json(&table, io::stdout().lock())?;
                println!();
            }
        },
    }

    Ok(())
}
