//! Per-entity report pipeline.
//!
//! For one entity, every [`TableKind`] is fetched, normalized and exported in
//! turn. A failure in one kind is logged with its entity and resource and the
//! run moves on to the next kind. Only failing to create the entity's output
//! directory aborts the entity.

use super::manifest::{ReportManifest, TableKind};
use super::normalize::{
    extract_alarm_ids, normalize_alarm_details, normalize_hosts, normalize_log_source_overview,
    normalize_log_volume, normalize_pending_log_sources,
};
use super::types::{Entity, ExportTable, DAYS_PER_WEEK};
use crate::api::{ApiError, ApiTransport, SiemApi};
use crate::api::endpoints::SILENT_LOG_SOURCE_RULE;
use crate::export::{ExportOutcome, ExportSink};
use crate::utils::time::ReportWindow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const DEFAULT_DECK_NAME: &str = "Q3DIRTogMDR";

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    pub alarm_rule: String,
    pub deck_name: String,
    /// Report date: end of the volume window and the day alarms are searched.
    pub today: NaiveDate,
}

impl ReportSettings {
    pub fn new(output_dir: impl Into<PathBuf>, today: NaiveDate) -> Self {
        Self {
            output_dir: output_dir.into(),
            alarm_rule: SILENT_LOG_SOURCE_RULE.to_string(),
            deck_name: DEFAULT_DECK_NAME.to_string(),
            today,
        }
    }

    /// The week of log volume ending at `today`. Rates are per day of this
    /// week, so the window length is fixed.
    pub fn window(&self) -> ReportWindow {
        ReportWindow::ending(self.today, DAYS_PER_WEEK as i64)
    }
}

/// What a report run produced for one entity.
#[derive(Debug, Default)]
pub struct EntityReport {
    pub entity: String,
    pub directory: PathBuf,
    pub written: Vec<(TableKind, PathBuf)>,
    /// Kinds that had no data.
    pub skipped: Vec<TableKind>,
    pub failures: Vec<(TableKind, String)>,
    pub manifest: Option<PathBuf>,
}

impl EntityReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.manifest.is_some()
    }
}

/// Entity names become directory and file names.
pub fn path_safe_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

pub fn table_path(directory: &Path, entity: &str, kind: TableKind, extension: &str) -> PathBuf {
    directory.join(format!("{}_{}.{}", entity, kind.file_stem(), extension))
}

async fn build_table<T: ApiTransport>(
    api: &SiemApi<T>,
    kind: TableKind,
    entity: &Entity,
    settings: &ReportSettings,
) -> Result<ExportTable, ApiError> {
    let table = match kind {
        TableKind::Hosts => {
            let items = api.fetch_entity_hosts(&entity.name).await?;
            normalize_hosts(&items).to_export()
        }
        TableKind::LogSourceOverview => {
            let items = api.fetch_log_sources(&entity.id).await?;
            normalize_log_source_overview(&items, &entity.name).to_export()
        }
        TableKind::LogVolume => {
            let items = api.fetch_log_volume(&entity.id, &settings.window()).await?;
            normalize_log_volume(&items).to_export()
        }
        TableKind::MissingLogs => {
            let alarms = api
                .fetch_alarms(&entity.name, &settings.alarm_rule, settings.today)
                .await?;
            let details = api.fetch_alarm_details(&extract_alarm_ids(&alarms)).await;
            normalize_alarm_details(&details, &entity.name).to_export()
        }
        TableKind::PendingLogSources => {
            let items = api.fetch_pending_log_sources().await?;
            normalize_pending_log_sources(&items, &entity.name).to_export()
        }
    };
    Ok(table)
}

/// Fetch, normalize and export every table for `entity`, then write its
/// manifest listing the tables that were written.
pub async fn generate_entity_report<T, S>(
    api: &SiemApi<T>,
    sink: &S,
    entity: &Entity,
    settings: &ReportSettings,
) -> Result<EntityReport>
where
    T: ApiTransport,
    S: ExportSink + ?Sized,
{
    let file_name = path_safe_name(&entity.name);
    let directory = settings.output_dir.join(&file_name);
    fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;

    info!(entity = %entity.name, directory = %directory.display(), "Generating report");

    let mut report = EntityReport {
        entity: entity.name.clone(),
        directory: directory.clone(),
        ..EntityReport::default()
    };
    let mut manifest =
        ReportManifest::new(&entity.name, &file_name, &settings.deck_name, settings.today);

    for kind in TableKind::ALL {
        let table = match build_table(api, kind, entity, settings).await {
            Ok(table) => table,
            Err(err) => {
                error!(entity = %entity.name, resource = kind.file_stem(), error = %err, "Failed to fetch data");
                report.failures.push((kind, err.to_string()));
                continue;
            }
        };

        let destination = table_path(&directory, &file_name, kind, sink.extension());
        match sink.write_table(&table, &destination) {
            Ok(ExportOutcome::Written { path, rows }) => {
                info!(entity = %entity.name, resource = kind.file_stem(), rows, "Table exported");
                manifest.add_table(kind, path.clone());
                report.written.push((kind, path));
            }
            Ok(ExportOutcome::Skipped) => report.skipped.push(kind),
            Err(err) => {
                error!(entity = %entity.name, resource = kind.file_stem(), error = %err, "Failed to export table");
                report.failures.push((kind, err.to_string()));
            }
        }
    }

    let manifest_path = directory.join(format!("{}_manifest.json", file_name));
    match manifest.write(&manifest_path) {
        Ok(()) => report.manifest = Some(manifest_path),
        Err(err) => error!(entity = %entity.name, error = %err, "Failed to write manifest"),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiBase, ApiErrorKind, HttpMethod, Params};
    use crate::export::{CsvSink, ExportError};
    use crate::export::read_table;
    use crate::report::OpaqueId;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::io;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct CannedTransport;

    #[async_trait]
    impl ApiTransport for CannedTransport {
        async fn call(
            &self,
            _base: ApiBase,
            resource: &str,
            _method: HttpMethod,
            _params: &Params,
        ) -> Result<Value, ApiError> {
            match resource {
                "hosts/" => Ok(json!([{
                    "id": 1,
                    "name": "dc01",
                    "entity": {"id": 5, "name": "Acme"},
                    "hostIdentifiers": [{"type": "IPAddress", "value": "10.0.0.1"}]
                }])),
                "logsources/" => Ok(json!([
                    {"entity": {"name": "Acme"}, "logSourceType": {"name": "Firewall"}}
                ])),
                "logvolume/" => Err(ApiError::new(ApiErrorKind::Timeout, "timed out")),
                "alarms/" => Ok(json!({"alarmsSearchDetails": []})),
                _ => Ok(json!([])),
            }
        }
    }

    fn acme() -> Entity {
        Entity {
            id: OpaqueId::Number(5),
            name: "Acme".to_string(),
        }
    }

    #[test]
    fn test_path_safe_name() {
        assert_eq!(path_safe_name("Acme A/S"), "Acme A_S");
        assert_eq!(path_safe_name(" .. "), "_");
        assert_eq!(path_safe_name("Nord\\Syd"), "Nord_Syd");
    }

    #[tokio::test]
    async fn test_failed_kind_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let settings = ReportSettings::new(dir.path(), today);
        let api = SiemApi::new(CannedTransport);

        let report = generate_entity_report(&api, &CsvSink, &acme(), &settings)
            .await
            .unwrap();

        let written: Vec<TableKind> = report.written.iter().map(|(k, _)| *k).collect();
        assert_eq!(written, vec![TableKind::Hosts, TableKind::LogSourceOverview]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, TableKind::LogVolume);
        assert_eq!(
            report.skipped,
            vec![TableKind::MissingLogs, TableKind::PendingLogSources]
        );
        assert!(dir.path().join("Acme").join("Acme_hosts.csv").exists());
        assert!(dir.path().join("Acme").join("Acme_manifest.json").exists());
        assert!(!report.is_complete());
    }

    /// Fails the write of one table kind and writes the rest as CSV.
    struct RejectingSink(TableKind);

    impl ExportSink for RejectingSink {
        fn extension(&self) -> &'static str {
            "csv"
        }

        fn write_table(&self, table: &ExportTable, destination: &Path) -> Result<ExportOutcome, ExportError> {
            let suffix = format!("_{}.csv", self.0.file_stem());
            if destination.to_string_lossy().ends_with(&suffix) {
                return Err(ExportError::Io {
                    path: destination.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            CsvSink.write_table(table, destination)
        }
    }

    #[tokio::test]
    async fn test_export_failure_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings::new(dir.path(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        let api = SiemApi::new(CannedTransport);

        let report = generate_entity_report(&api, &RejectingSink(TableKind::Hosts), &acme(), &settings)
            .await
            .unwrap();

        let failed: Vec<TableKind> = report.failures.iter().map(|(k, _)| *k).collect();
        assert_eq!(failed, vec![TableKind::Hosts, TableKind::LogVolume]);
        assert!(report.failures[0].1.contains("read-only"));

        let written: Vec<TableKind> = report.written.iter().map(|(k, _)| *k).collect();
        assert_eq!(written, vec![TableKind::LogSourceOverview]);
        assert!(!dir.path().join("Acme").join("Acme_hosts.csv").exists());

        let manifest_path = report.manifest.clone().unwrap();
        let manifest: Value = serde_json::from_str(&fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(manifest["tables"].as_array().unwrap().len(), 1);
        assert_eq!(manifest["tables"][0]["kind"], "log_source_overview");
    }

    #[derive(Default)]
    struct VolumeTransport {
        volume_request: Mutex<Option<Params>>,
    }

    #[async_trait]
    impl ApiTransport for VolumeTransport {
        async fn call(
            &self,
            _base: ApiBase,
            resource: &str,
            _method: HttpMethod,
            params: &Params,
        ) -> Result<Value, ApiError> {
            match resource {
                "logvolume/" => {
                    *self.volume_request.lock().unwrap() = Some(params.clone());
                    Ok(json!({"data": [{
                        "logSourceTypeInfo": [{"logSourceType": "Firewall", "logsCount": 70000}],
                        "totalLogs": 70000
                    }]}))
                }
                "alarms/" => Ok(json!({"alarmsSearchDetails": []})),
                _ => Ok(json!([])),
            }
        }
    }

    #[tokio::test]
    async fn test_volume_rates_match_window() {
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings::new(dir.path(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        let api = SiemApi::new(VolumeTransport::default());

        generate_entity_report(&api, &CsvSink, &acme(), &settings)
            .await
            .unwrap();

        let request = api.transport().volume_request.lock().unwrap().clone().unwrap();
        assert_eq!(request["minDate"], "2025-02-26");
        assert_eq!(request["maxDate"], "2025-03-05");

        // 70,000 logs over the 7-day window
        let table = read_table(&dir.path().join("Acme").join("Acme_log_volume.csv")).unwrap();
        assert_eq!(table.rows[0], vec!["Firewall", "70,000", "10,000", "0"]);
    }

    #[tokio::test]
    async fn test_deck_name_is_path_safe() {
        let dir = TempDir::new().unwrap();
        let settings = ReportSettings::new(dir.path(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        let api = SiemApi::new(CannedTransport);
        let entity = Entity {
            id: OpaqueId::Number(5),
            name: "Acme A/S".to_string(),
        };

        let report = generate_entity_report(&api, &CsvSink, &entity, &settings)
            .await
            .unwrap();

        assert_eq!(report.directory, dir.path().join("Acme A_S"));
        let manifest: Value =
            serde_json::from_str(&fs::read_to_string(report.manifest.unwrap()).unwrap()).unwrap();
        assert_eq!(manifest["deck"], "Acme A_S_Q3DIRTogMDR.pptx");
        assert_eq!(manifest["placeholders"][0]["value"], "Acme A/S");
    }
}
