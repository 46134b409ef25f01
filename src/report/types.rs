//! Report record types and the tables they are exported in.
//!
//! Each record type knows its column headers and how to render itself as a
//! row. A [`Table`] pairs the data records with one [`SummaryRecord`] that has
//! the same columns, so every exported table stays rectangular while callers
//! can still tell data rows from the total row.

use crate::utils::format::{format_number, round_half_even};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

pub const DAYS_PER_WEEK: u64 = 7;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Identifier as handed out by the API, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpaqueId {
    Number(i64),
    Text(String),
}

impl OpaqueId {
    /// The identifier as a JSON value of its original type.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => json!(n),
            Self::Text(s) => json!(s),
        }
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OpaqueId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for OpaqueId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A record that can be written as one table row.
pub trait TableRecord {
    const HEADERS: &'static [&'static str];

    /// Cell values in [`Self::HEADERS`] order.
    fn cells(&self) -> Vec<String>;
}

/// The trailing total row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    cells: Vec<String>,
}

impl SummaryRecord {
    /// Label in the first column, `value` in the last, blanks in between.
    pub fn labelled<R: TableRecord>(label: &str, value: impl fmt::Display) -> Self {
        let width = R::HEADERS.len();
        let mut cells = vec![String::new(); width];
        if let Some(first) = cells.first_mut() {
            *first = label.to_string();
        }
        if width > 1 {
            cells[width - 1] = value.to_string();
        }
        Self { cells }
    }

    /// Explicit cells, padded or truncated to the width of `R`.
    pub fn with_cells<R: TableRecord>(mut cells: Vec<String>) -> Self {
        debug_assert_eq!(cells.len(), R::HEADERS.len());
        cells.resize(R::HEADERS.len(), String::new());
        Self { cells }
    }

    pub fn label(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or_default()
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a, R> {
    Data(&'a R),
    Summary(&'a SummaryRecord),
}

impl<R: TableRecord> Row<'_, R> {
    pub fn cells(&self) -> Vec<String> {
        match self {
            Self::Data(record) => record.cells(),
            Self::Summary(summary) => summary.cells().to_vec(),
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, Self::Summary(_))
    }
}

/// Normalized records of one data kind plus their total row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    records: Vec<R>,
    summary: Option<SummaryRecord>,
}

impl<R: TableRecord> Table<R> {
    /// A table with no rows at all; exporting it writes nothing.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            summary: None,
        }
    }

    pub fn new(records: Vec<R>, summary: SummaryRecord) -> Self {
        Self {
            records,
            summary: Some(summary),
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn summary(&self) -> Option<&SummaryRecord> {
        self.summary.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.summary.is_none()
    }

    /// Number of rows including the summary row.
    pub fn len(&self) -> usize {
        self.records.len() + usize::from(self.summary.is_some())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_, R>> {
        self.records
            .iter()
            .map(Row::Data)
            .chain(self.summary.iter().map(Row::Summary))
    }

    /// Render to plain strings for an [`ExportSink`](crate::export::ExportSink).
    pub fn to_export(&self) -> ExportTable {
        ExportTable {
            headers: R::HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: self.records.iter().map(TableRecord::cells).collect(),
            summary: self.summary.as_ref().map(|s| s.cells().to_vec()),
        }
    }
}

/// A table rendered to strings, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: Option<Vec<String>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.summary.is_none()
    }

    /// Data rows followed by the summary row.
    pub fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter().chain(self.summary.iter())
    }
}

/// A customer entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: OpaqueId,
    pub name: String,
}

impl TableRecord for Entity {
    const HEADERS: &'static [&'static str] = &["Entity ID", "Entity Name"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

/// An onboarded host of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub id: Option<OpaqueId>,
    pub entity_id: Option<OpaqueId>,
    pub entity_name: String,
    pub hostname: String,
    pub ip_addresses: Vec<String>,
}

impl TableRecord for HostRecord {
    const HEADERS: &'static [&'static str] =
        &["ID", "Entity ID", "Entity Name", "Hostname", "IP Addresses"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.entity_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.entity_name.clone(),
            self.hostname.clone(),
            self.ip_addresses.join(", "),
        ]
    }
}

/// Number of log sources of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSourceCount {
    pub log_source_type_name: String,
    pub count: usize,
}

impl TableRecord for LogSourceCount {
    const HEADERS: &'static [&'static str] = &["Log Source Type", "Count"];

    fn cells(&self) -> Vec<String> {
        vec![self.log_source_type_name.clone(), self.count.to_string()]
    }
}

/// A log source awaiting acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogSource {
    pub name: String,
    pub ip_address: String,
}

impl TableRecord for PendingLogSource {
    const HEADERS: &'static [&'static str] = &["Log Source Name", "IP Addresses"];

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.ip_address.clone()]
    }
}

/// Weekly log volume of one log source type with derived rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogVolumeEntry {
    pub log_source_type_name: String,
    pub logs_count: u64,
    pub logs_per_day: u64,
    pub logs_per_second: u64,
}

impl LogVolumeEntry {
    /// Derives per-day and per-second rates from a one-week count.
    pub fn from_weekly_count(log_source_type_name: impl Into<String>, logs_count: u64) -> Self {
        Self {
            log_source_type_name: log_source_type_name.into(),
            logs_count,
            logs_per_day: round_half_even(logs_count, DAYS_PER_WEEK),
            logs_per_second: round_half_even(logs_count, DAYS_PER_WEEK * SECONDS_PER_DAY),
        }
    }
}

impl TableRecord for LogVolumeEntry {
    const HEADERS: &'static [&'static str] = &["Log Source Type", "Logs Count", "Logs/D", "Logs/S"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.log_source_type_name.clone(),
            format_number(self.logs_count),
            format_number(self.logs_per_day),
            format_number(self.logs_per_second),
        ]
    }
}

/// The log source named by a silent-log-source alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmDetailRecord {
    pub log_source_name: String,
    pub log_source_host_name: String,
    pub log_date: String,
}

impl TableRecord for AlarmDetailRecord {
    const HEADERS: &'static [&'static str] = &["Log Source Name", "Log Source Host Name", "Log Date"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.log_source_name.clone(),
            self.log_source_host_name.clone(),
            self.log_date.clone(),
        ]
    }
}
