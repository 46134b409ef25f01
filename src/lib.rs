//! # LR Report Tools
//!
//! Command-line tools that pull customer security-posture data out of a
//! LogRhythm-style SIEM platform and turn it into per-customer report tables.
//!
//! ## Overview
//!
//! A report run walks four stages for every selected customer entity:
//!
//! 1. [`api::ApiClient`] sends authenticated requests to one of three API bases
//!    (administration, metrics, alarms).
//! 2. [`api::HttpResultPager`] pages through list endpoints with `count`/`offset`
//!    until a short page ends the data.
//! 3. [`report::normalize`] flattens each raw JSON shape into a rectangular
//!    [`report::Table`] with a trailing summary row.
//! 4. [`export`] writes each table to CSV or JSON, and the pipeline emits a
//!    manifest that downstream slide tooling consumes.
//!
//! ## Architecture
//!
//! - [`api`] - REST client, pagination and typed endpoint fetchers
//! - [`config`] - Connection settings from flags and environment
//! - [`report`] - Record types, normalizers, manifest and per-entity pipeline
//! - [`export`] - Table sinks (CSV, JSON) and CSV read-back
//! - [`commands`] - CLI command implementations
//! - [`utils`] - Number formatting, report windows, progress bars
//!
//! ## Example Usage
//!
//! ```bash
//! export LR_ADMIN_URL=https://siem.example.com:8501/lr-admin-api
//! export LR_METRICS_URL=https://siem.example.com:8501/lr-metrics-api
//! export LR_ALARM_URL=https://siem.example.com:8501/lr-alarm-api
//! export LR_API_TOKEN=eyJhbGciOi...
//!
//! # List customer entities
//! lr-report entities --output entities.csv
//!
//! # Build report tables for two customers
//! lr-report report --entity "Acme Corp" --entity "Globex" --output-dir reports/
//!
//! # Every customer, JSON tables
//! lr-report report --all --format json
//!
//! # Inspect an exported table
//! lr-report show "reports/Acme Corp/Acme Corp_log_volume.csv"
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod export;
pub mod report;
pub mod utils;
