//! Command implementations for the report tool.
//!
//! - [`entities`] - List customer entities
//! - [`report`] - Generate report tables and manifests per entity
//! - [`show`] - Print an exported table

pub mod entities;
pub mod report;
pub mod show;

use crate::api::{ApiClient, SiemApi};
use crate::config::{ApiConfig, ApiOptions};
use anyhow::Result;

/// Resolve connection options and build the typed API on top of a live client.
pub(crate) fn connect(options: &ApiOptions) -> Result<(ApiConfig, SiemApi<ApiClient>)> {
    let config = options.resolve()?;
    let client = ApiClient::new(&config)?;
    let api = SiemApi::new(client).with_policy(config.empty_page_policy);
    Ok((config, api))
}

pub(crate) fn print_connection(config: &ApiConfig) {
    eprintln!("Admin API:   {}", config.admin_url);
    eprintln!("Metrics API: {}", config.metrics_url);
    eprintln!("Alarm API:   {}", config.alarm_url);
    if config.skip_verify {
        eprintln!("⚠️  TLS certificate verification is DISABLED");
    }
    eprintln!();
}
