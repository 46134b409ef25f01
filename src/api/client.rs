use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info, warn};

/// Query parameters (GET) or JSON body fields (POST) of a request.
pub type Params = Map<String, Value>;

/// The three logical API bases a request can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiBase {
    Admin,
    Metrics,
    Alarm,
}

impl fmt::Display for ApiBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Metrics => "metrics",
            Self::Alarm => "alarm",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            other => Err(ApiError::new(
                ApiErrorKind::UnsupportedMethod,
                format!("Unsupported HTTP method: {}", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    ConnectionFailure,
    Timeout,
    HttpStatus,
    UnsupportedMethod,
    OtherRequestFailure,
    /// A page carried no data payload while the pager ran with
    /// [`EmptyPagePolicy::Fail`](crate::api::EmptyPagePolicy::Fail).
    EmptyResponse,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConnectionFailure => "Connection Error",
            Self::Timeout => "Timeout Error",
            Self::HttpStatus => "HTTP Error",
            Self::UnsupportedMethod => "Unsupported Method",
            Self::OtherRequestFailure => "Request Error",
            Self::EmptyResponse => "Empty Response",
        };
        f.write_str(label)
    }
}

/// A failed API request, tagged with what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // Connect timeouts report both, timeout wins.
        let kind = if err.is_timeout() {
            ApiErrorKind::Timeout
        } else if err.is_connect() {
            ApiErrorKind::ConnectionFailure
        } else if err.is_status() {
            ApiErrorKind::HttpStatus
        } else {
            ApiErrorKind::OtherRequestFailure
        };
        Self::new(kind, err.to_string())
    }
}

/// Anything that can answer a single API request with a JSON document.
///
/// [`ApiClient`] is the HTTP implementation; the pager and endpoint fetchers
/// only depend on this trait.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn call(
        &self,
        base: ApiBase,
        resource: &str,
        method: HttpMethod,
        params: &Params,
    ) -> Result<Value, ApiError>;
}

/// Authenticated HTTP client for the administration, metrics and alarm APIs.
#[derive(Debug, Clone)]
pub struct ApiClient {
    admin_url: String,
    metrics_url: String,
    alarm_url: String,
    token: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.skip_verify {
            warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(config.skip_verify)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            admin_url: config.admin_url.trim_end_matches('/').to_string(),
            metrics_url: config.metrics_url.trim_end_matches('/').to_string(),
            alarm_url: config.alarm_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }

    pub fn base_url(&self, base: ApiBase) -> &str {
        match base {
            ApiBase::Admin => &self.admin_url,
            ApiBase::Metrics => &self.metrics_url,
            ApiBase::Alarm => &self.alarm_url,
        }
    }

    /// Full URL for `resource` under `base`, with exactly one `/` between them.
    pub fn url_for(&self, base: ApiBase, resource: &str) -> String {
        format!("{}/{}", self.base_url(base), resource.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiTransport for ApiClient {
    async fn call(
        &self,
        base: ApiBase,
        resource: &str,
        method: HttpMethod,
        params: &Params,
    ) -> Result<Value, ApiError> {
        let url = self.url_for(base, resource);
        info!(%base, %method, %url, "Making API call");

        let request = match method {
            HttpMethod::Get => self.client.get(&url).query(&query_pairs(params)),
            HttpMethod::Post => self.client.post(&url).json(params),
        };

        let response = request.bearer_auth(&self.token).send().await.map_err(|e| {
            let err = ApiError::from(e);
            error!(%url, error = %err, "API call failed");
            err
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let err = ApiError::from(e);
            error!(%url, error = %err, "Failed to read response body");
            err
        })?;

        if !status.is_success() {
            error!(%url, status = status.as_u16(), body = %body, "API call failed");
            return Err(ApiError::new(
                ApiErrorKind::HttpStatus,
                format!("{} returned status {}", url, status),
            ));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(%url, body = %body, "Response is not valid JSON");
            ApiError::new(
                ApiErrorKind::OtherRequestFailure,
                format!("Failed to parse JSON response from {}: {}", url, e),
            )
        })
    }
}

/// Flattens params into query-string pairs. Nested values are sent as JSON text.
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}
