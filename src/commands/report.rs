//! Generate the report tables for one or more entities.
//!
//! For every selected entity a directory `<output-dir>/<entity>/` receives the
//! hosts, log source overview, log volume, missing logs and pending log source
//! tables, plus a manifest for the deck tooling.
//!
//! # Usage
//!
//! ```bash
//! lr-report report --entity Acme --entity Globex --output-dir reports
//! lr-report report --all --format json
//! ```

use super::{connect, print_connection};
use crate::api::endpoints::SILENT_LOG_SOURCE_RULE;
use crate::config::ApiOptions;
use crate::export::ExportFormat;
use crate::report::normalize::normalize_entities;
use crate::report::pipeline::DEFAULT_DECK_NAME;
use crate::report::{generate_entity_report, Entity, EntityReport, ReportSettings};
use crate::utils::progress::ProgressBar;
use crate::utils::time::today;
use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::error;

#[derive(Debug, Clone, Args)]
pub struct ReportOptions {
    /// Entity to report on (repeatable)
    #[arg(long = "entity", value_name = "NAME")]
    pub entities: Vec<String>,

    /// Report on every customer entity
    #[arg(long, conflicts_with = "entities")]
    pub all: bool,

    /// Directory that receives one subdirectory per entity
    #[arg(short, long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// Table file format
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Alarm rule that flags log sources that stopped sending logs
    #[arg(long, default_value = SILENT_LOG_SOURCE_RULE)]
    pub alarm_rule: String,

    /// Deck name used in the manifest's output file name
    #[arg(long, default_value = DEFAULT_DECK_NAME)]
    pub deck_name: String,
}

/// Pick the entities to report on. `--all` takes every entity sorted by name;
/// otherwise each requested name must exist.
pub fn select_entities(available: Vec<Entity>, names: &[String], all: bool) -> Result<Vec<Entity>> {
    if all {
        let mut selected = available;
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        return Ok(selected);
    }

    if names.is_empty() {
        bail!("No entities selected. Pass --entity <NAME> (repeatable) or --all");
    }

    let mut selected = Vec::with_capacity(names.len());
    let mut unknown = Vec::new();
    for name in names {
        match available.iter().find(|e| e.name == *name) {
            Some(entity) => {
                if !selected.contains(entity) {
                    selected.push(entity.clone());
                }
            }
            None => unknown.push(name.as_str()),
        }
    }

    if !unknown.is_empty() {
        bail!("Unknown entities: {}", unknown.join(", "));
    }
    Ok(selected)
}

pub async fn run(api_options: &ApiOptions, options: &ReportOptions) -> Result<()> {
    let (config, api) = connect(api_options)?;

    eprintln!("=== Customer Report ===");
    print_connection(&config);

    eprintln!("Fetching entities...");
    let items = api.fetch_entities().await.context("Failed to fetch entities")?;
    let entities = select_entities(normalize_entities(&items), &options.entities, options.all)?;
    eprintln!("Generating reports for {} entities", entities.len());
    eprintln!("Output directory: {}", options.output_dir.display());
    eprintln!();

    let settings = ReportSettings {
        output_dir: options.output_dir.clone(),
        alarm_rule: options.alarm_rule.clone(),
        deck_name: options.deck_name.clone(),
        today: today(),
    };

    let progress = ProgressBar::new(entities.len(), "Reports");
    let mut reports: Vec<EntityReport> = Vec::with_capacity(entities.len());
    let mut aborted = Vec::new();

    for entity in &entities {
        progress.set_message(&entity.name);
        match generate_entity_report(&api, &options.format, entity, &settings).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                error!(entity = %entity.name, error = %err, "Report aborted");
                progress.println(format!("✗ {}: {:#}", entity.name, err));
                aborted.push(entity.name.clone());
            }
        }
        progress.inc();
    }
    progress.finish_with_message("Reports done");

    eprintln!();
    eprintln!("=== Summary ===");
    for report in &reports {
        let marker = if report.is_complete() { "✓" } else { "⚠️ " };
        eprintln!(
            "{} {}: {} tables written, {} empty, {} failed",
            marker,
            report.entity,
            report.written.len(),
            report.skipped.len(),
            report.failures.len()
        );
        for (kind, message) in &report.failures {
            eprintln!("    {}: {}", kind.file_stem(), message);
        }
    }
    for name in &aborted {
        eprintln!("✗ {}: aborted", name);
    }

    let total_tables: usize = reports.iter().map(|r| r.written.len()).sum();
    eprintln!();
    eprintln!("Total tables written: {}", total_tables);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OpaqueId;

    fn entity(id: i64, name: &str) -> Entity {
        Entity {
            id: OpaqueId::Number(id),
            name: name.to_string(),
        }
    }

    fn available() -> Vec<Entity> {
        vec![entity(1, "Globex"), entity(2, "Acme"), entity(3, "Initech")]
    }

    #[test]
    fn test_select_all_sorted() {
        let names: Vec<String> = select_entities(available(), &[], true)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Acme", "Globex", "Initech"]);
    }

    #[test]
    fn test_select_named_keeps_request_order() {
        let requested = vec!["Initech".to_string(), "Acme".to_string(), "Initech".to_string()];
        let selected = select_entities(available(), &requested, false).unwrap();
        assert_eq!(selected, vec![entity(3, "Initech"), entity(2, "Acme")]);
    }

    #[test]
    fn test_select_unknown_entity() {
        let requested = vec!["Acme".to_string(), "Hooli".to_string()];
        let err = select_entities(available(), &requested, false).unwrap_err();
        assert!(err.to_string().contains("Hooli"));
    }

    #[test]
    fn test_select_nothing() {
        assert!(select_entities(available(), &[], false).is_err());
    }

    #[derive(clap::Parser)]
    struct ReportCli {
        #[command(flatten)]
        options: ReportOptions,
    }

    #[test]
    fn test_volume_window_not_configurable() {
        use clap::Parser;

        assert!(ReportCli::try_parse_from(["report", "--all"]).is_ok());
        assert!(ReportCli::try_parse_from(["report", "--all", "--days", "14"]).is_err());
    }
}
