//! Report tables and the per-entity pipeline that produces them.
//!
//! - [`raw`] - Deserializable shapes of the API items
//! - [`types`] - Record types, summary rows and tables
//! - [`normalize`] - Raw items to tables
//! - [`manifest`] - Deck placeholders and table placement
//! - [`pipeline`] - Fetch, normalize and export everything for one entity

pub mod manifest;
pub mod normalize;
pub mod pipeline;
pub mod raw;
pub mod types;

pub use manifest::{ReportManifest, SlidePlacement, TableKind};
pub use pipeline::{generate_entity_report, EntityReport, ReportSettings};
pub use types::{
    AlarmDetailRecord, Entity, ExportTable, HostRecord, LogSourceCount, LogVolumeEntry, OpaqueId,
    PendingLogSource, Row, SummaryRecord, Table, TableRecord,
};
