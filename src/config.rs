//! Connection settings for the SIEM APIs.
//!
//! Every setting resolves in the same order: command-line flag, then
//! environment variable, then default. Base URLs and the bearer token have no
//! default and must be provided one way or the other.

use crate::api::EmptyPagePolicy;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::env;
use std::fs;
use std::time::Duration;

pub const ADMIN_URL_ENV: &str = "LR_ADMIN_URL";
pub const METRICS_URL_ENV: &str = "LR_METRICS_URL";
pub const ALARM_URL_ENV: &str = "LR_ALARM_URL";
pub const TOKEN_ENV: &str = "LR_API_TOKEN";
pub const TOKEN_FILE_ENV: &str = "LR_API_TOKEN_FILE";
pub const SKIP_VERIFY_ENV: &str = "LR_SKIP_VERIFY";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved connection settings shared read-only by every request of a run.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub admin_url: String,
    pub metrics_url: String,
    pub alarm_url: String,
    pub token: String,
    pub skip_verify: bool,
    pub timeout: Duration,
    pub empty_page_policy: EmptyPagePolicy,
}

/// Connection flags shared by every command that talks to the API.
#[derive(Debug, Clone, Default, Args)]
pub struct ApiOptions {
    /// Administration API base URL (default: $LR_ADMIN_URL)
    #[arg(long)]
    pub admin_url: Option<String>,

    /// Metrics API base URL (default: $LR_METRICS_URL)
    #[arg(long)]
    pub metrics_url: Option<String>,

    /// Alarm API base URL (default: $LR_ALARM_URL)
    #[arg(long)]
    pub alarm_url: Option<String>,

    /// Bearer token (default: $LR_API_TOKEN or $LR_API_TOKEN_FILE)
    #[arg(long)]
    pub token: Option<String>,

    /// Skip TLS certificate verification (insecure)
    #[arg(long)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Treat a page with no data payload as an error instead of end-of-data
    #[arg(long)]
    pub strict_pages: bool,
}

impl ApiOptions {
    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<ApiConfig> {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ApiConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_url = required_url(self.admin_url.as_deref(), ADMIN_URL_ENV, "--admin-url", &lookup)?;
        let metrics_url =
            required_url(self.metrics_url.as_deref(), METRICS_URL_ENV, "--metrics-url", &lookup)?;
        let alarm_url = required_url(self.alarm_url.as_deref(), ALARM_URL_ENV, "--alarm-url", &lookup)?;

        let token = if let Some(t) = &self.token {
            t.clone()
        } else if let Some(t) = lookup(TOKEN_ENV) {
            t
        } else if let Some(token_file) = lookup(TOKEN_FILE_ENV) {
            fs::read_to_string(&token_file)
                .with_context(|| format!("Failed to read token from file: {}", token_file))?
                .trim()
                .to_string()
        } else {
            return Err(anyhow!(
                "An API token is required. Provide one via:\n\
                 - Command-line: --token <TOKEN>\n\
                 - Environment variable: export {}=<TOKEN>\n\
                 - Token file: export {}=/path/to/token",
                TOKEN_ENV,
                TOKEN_FILE_ENV
            ));
        };

        if token.trim().is_empty() {
            return Err(anyhow!("The API token is empty"));
        }

        let skip_verify = self.insecure || lookup(SKIP_VERIFY_ENV).is_some_and(|v| parse_flag(&v));

        Ok(ApiConfig {
            admin_url,
            metrics_url,
            alarm_url,
            token,
            skip_verify,
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            empty_page_policy: if self.strict_pages {
                EmptyPagePolicy::Fail
            } else {
                EmptyPagePolicy::Complete
            },
        })
    }
}

fn required_url<F>(flag: Option<&str>, env_key: &str, flag_name: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = flag
        .map(|s| s.to_string())
        .or_else(|| lookup(env_key))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing API base URL: pass {} or set {}", flag_name, env_key))?;

    Ok(raw.trim().trim_end_matches('/').to_string())
}

/// Accepts `1`, `true` and `yes` (case-insensitive) as enabled.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
