//! Report manifest for downstream deck tooling.
//!
//! The slide tooling copies the deck template, substitutes the placeholder
//! tokens and inserts each listed table at its slide and offset. The manifest
//! is the only thing it needs from a report run.

use crate::utils::time::deck_date;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const CUSTOMER_TOKEN: &str = "<Kunden>";
pub const DATE_TOKEN: &str = "<Dato>";

/// The tables a report run produces per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Hosts,
    LogSourceOverview,
    LogVolume,
    MissingLogs,
    PendingLogSources,
}

/// Where a table goes in the deck: 1-based slide number and offset in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlidePlacement {
    pub slide: u32,
    pub left: f64,
    pub top: f64,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        Self::Hosts,
        Self::LogSourceOverview,
        Self::LogVolume,
        Self::MissingLogs,
        Self::PendingLogSources,
    ];

    /// Suffix of the exported file name.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Hosts => "hosts",
            Self::LogSourceOverview => "log_source_overview",
            Self::LogVolume => "log_volume",
            Self::MissingLogs => "missing_logs",
            Self::PendingLogSources => "pending_log_sources",
        }
    }

    /// Deck slot of the table. Hosts are exported but not placed on a slide.
    pub fn placement(self) -> Option<SlidePlacement> {
        let (slide, left, top) = match self {
            Self::Hosts => return None,
            Self::LogSourceOverview => (17, 0.5, 1.6),
            Self::LogVolume => (18, 1.2, 1.2),
            Self::MissingLogs => (19, 0.5, 1.2),
            Self::PendingLogSources => (20, 1.2, 1.2),
        };
        Some(SlidePlacement { slide, left, top })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub token: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestTable {
    pub kind: TableKind,
    pub path: PathBuf,
    #[serde(flatten)]
    pub placement: Option<SlidePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportManifest {
    pub entity: String,
    /// File name the filled-in deck should get.
    pub deck: String,
    pub report_date: NaiveDate,
    pub placeholders: Vec<Placeholder>,
    pub tables: Vec<ManifestTable>,
}

impl ReportManifest {
    /// `file_name` is the entity name as used in paths; it names the deck
    /// while the placeholder keeps the entity name as displayed.
    pub fn new(entity: &str, file_name: &str, deck_name: &str, report_date: NaiveDate) -> Self {
        Self {
            entity: entity.to_string(),
            deck: format!("{}_{}.pptx", file_name, deck_name),
            report_date,
            placeholders: vec![
                Placeholder {
                    token: CUSTOMER_TOKEN.to_string(),
                    value: entity.to_string(),
                },
                Placeholder {
                    token: DATE_TOKEN.to_string(),
                    value: deck_date(report_date),
                },
            ],
            tables: Vec::new(),
        }
    }

    pub fn add_table(&mut self, kind: TableKind, path: PathBuf) {
        self.tables.push(ManifestTable {
            kind,
            path,
            placement: kind.placement(),
        });
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create manifest: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        Ok(())
    }
}
