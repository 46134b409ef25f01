//! Offset/count pagination.
//!
//! Every list endpoint of the SIEM APIs pages the same way: the caller sends
//! `count` and `offset`, and a page shorter than `count` is the last one. Only
//! the location of the item list inside the response differs per API, which is
//! what a [`PageExtractor`] captures.

use super::client::{ApiBase, ApiError, ApiErrorKind, ApiTransport, HttpMethod, Params};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

pub const PAGE_SIZE: usize = 1000;

/// Pulls the batch of items out of one raw page.
///
/// `None` means the page carried no item list at all (null body, missing
/// envelope field, wrong type). `Some(vec![])` is a well-formed empty page.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, response: Value) -> Option<Vec<Value>>;
}

/// Where the item list lives in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShape {
    /// The response body is the list (administration API).
    Bare,
    /// The list sits under a top-level field.
    Field(&'static str),
}

impl PageShape {
    pub const METRICS: Self = Self::Field("data");
    pub const ALARMS: Self = Self::Field("alarmsSearchDetails");
}

impl PageExtractor for PageShape {
    fn extract(&self, response: Value) -> Option<Vec<Value>> {
        match self {
            Self::Bare => into_list(response),
            Self::Field(key) => match response {
                Value::Object(mut envelope) => envelope.remove(*key).and_then(into_list),
                _ => None,
            },
        }
    }
}

/// Adapts a closure into a [`PageExtractor`].
pub struct ExtractWith<F>(pub F);

impl<F> PageExtractor for ExtractWith<F>
where
    F: Fn(Value) -> Option<Vec<Value>> + Send + Sync,
{
    fn extract(&self, response: Value) -> Option<Vec<Value>> {
        (self.0)(response)
    }
}

fn into_list(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// What to do when a page has no item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPagePolicy {
    /// Stop and return what has been accumulated.
    #[default]
    Complete,
    /// Fail the whole fetch with [`ApiErrorKind::EmptyResponse`].
    Fail,
}

/// Sequential paginated fetch over an [`ApiTransport`].
pub struct HttpResultPager<'a, T: ?Sized> {
    transport: &'a T,
    page_size: usize,
    policy: EmptyPagePolicy,
}

impl<'a, T: ApiTransport + ?Sized> HttpResultPager<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            page_size: PAGE_SIZE,
            policy: EmptyPagePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: EmptyPagePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch every page of `resource` and return the items in arrival order.
    ///
    /// `count` and `offset` are merged into `params`, overriding any caller
    /// values. An error on any page discards everything fetched so far.
    pub async fn fetch_all<E>(
        &self,
        base: ApiBase,
        resource: &str,
        params: &Params,
        method: HttpMethod,
        extractor: &E,
    ) -> Result<Vec<Value>, ApiError>
    where
        E: PageExtractor + ?Sized,
    {
        info!(%base, resource, "Fetching data with pagination");

        let mut items = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut page_params = params.clone();
            page_params.insert("count".to_string(), json!(self.page_size));
            page_params.insert("offset".to_string(), json!(offset));

            let response = self
                .transport
                .call(base, resource, method, &page_params)
                .await
                .map_err(|err| {
                    error!(%base, resource, offset, error = %err, "Error fetching data");
                    err
                })?;

            let Some(batch) = extractor.extract(response) else {
                match self.policy {
                    EmptyPagePolicy::Complete => {
                        warn!(%base, resource, offset, "No data received from API, ending fetch");
                        break;
                    }
                    EmptyPagePolicy::Fail => {
                        error!(%base, resource, offset, "No data received from API");
                        return Err(ApiError::new(
                            ApiErrorKind::EmptyResponse,
                            format!("{} {} returned no page data at offset {}", base, resource, offset),
                        ));
                    }
                }
            };

            let batch_len = batch.len();
            items.extend(batch);
            debug!(%base, resource, offset, batch_len, total = items.len(), "Fetched page");

            if batch_len < self.page_size {
                break;
            }
            offset += self.page_size;
        }

        info!(%base, resource, count = items.len(), "Pagination complete");
        Ok(items)
    }
}
