//! Typed fetchers for the report data kinds.
//!
//! Each fetcher knows its API base, resource, filters and page shape, and
//! returns the raw items for the normalizers.

use super::client::{ApiBase, ApiError, ApiTransport, HttpMethod, Params};
use super::pager::{EmptyPagePolicy, HttpResultPager, PageShape, PAGE_SIZE};
use crate::report::OpaqueId;
use crate::utils::time::{ReportWindow, API_DATE_FORMAT};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Rule whose alarms mark log sources that stopped sending logs.
pub const SILENT_LOG_SOURCE_RULE: &str = "DBX: LogRhythm Silent Log Source Error";

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

pub struct SiemApi<T> {
    transport: T,
    page_size: usize,
    policy: EmptyPagePolicy,
}

impl<T: ApiTransport> SiemApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            page_size: PAGE_SIZE,
            policy: EmptyPagePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: EmptyPagePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn pager(&self) -> HttpResultPager<'_, T> {
        HttpResultPager::new(&self.transport)
            .with_page_size(self.page_size)
            .with_policy(self.policy)
    }

    pub async fn fetch_entities(&self) -> Result<Vec<Value>, ApiError> {
        info!("Fetching entities");
        self.pager()
            .fetch_all(ApiBase::Admin, "entities/", &Params::new(), HttpMethod::Get, &PageShape::Bare)
            .await
    }

    pub async fn fetch_entity_hosts(&self, entity_name: &str) -> Result<Vec<Value>, ApiError> {
        info!(entity = entity_name, "Fetching entity hosts");
        let filters = params(json!({
            "entity": entity_name,
            "recordStatus": "active",
        }));
        self.pager()
            .fetch_all(ApiBase::Admin, "hosts/", &filters, HttpMethod::Get, &PageShape::Bare)
            .await
    }

    pub async fn fetch_log_sources(&self, entity_id: &OpaqueId) -> Result<Vec<Value>, ApiError> {
        info!(%entity_id, "Fetching log sources");
        let filters = params(json!({
            "recordStatus": "active",
            "orderBy": "logSourceType",
            "entityId": entity_id.to_json(),
        }));
        self.pager()
            .fetch_all(ApiBase::Admin, "logsources/", &filters, HttpMethod::Get, &PageShape::Bare)
            .await
    }

    /// Pending log source requests across all entities.
    pub async fn fetch_pending_log_sources(&self) -> Result<Vec<Value>, ApiError> {
        info!("Fetching pending log sources");
        let filters = params(json!({
            "logSourceAcceptanceStatus": "Pending",
            "orderBy": "name",
        }));
        self.pager()
            .fetch_all(
                ApiBase::Admin,
                "logsources-request/",
                &filters,
                HttpMethod::Get,
                &PageShape::Bare,
            )
            .await
    }

    pub async fn fetch_log_volume(
        &self,
        entity_id: &OpaqueId,
        window: &ReportWindow,
    ) -> Result<Vec<Value>, ApiError> {
        info!(%entity_id, "Fetching log volume");
        let body = params(json!({
            "minDate": window.min_param(),
            "maxDate": window.max_param(),
            "groupBy": {
                "fieldName": "Entity",
                "Ids": [entity_id.to_json()],
            },
        }));
        self.pager()
            .fetch_all(ApiBase::Metrics, "logvolume/", &body, HttpMethod::Post, &PageShape::METRICS)
            .await
    }

    /// Alarms raised by `rule_name` for `entity_name` on `date`.
    pub async fn fetch_alarms(
        &self,
        entity_name: &str,
        rule_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<Value>, ApiError> {
        info!(entity = entity_name, rule = rule_name, "Fetching alarms");
        let filters = params(json!({
            "alarmRuleName": rule_name,
            "dateInserted": date.format(API_DATE_FORMAT).to_string(),
            "entityName": entity_name,
        }));
        self.pager()
            .fetch_all(ApiBase::Alarm, "alarms/", &filters, HttpMethod::Get, &PageShape::ALARMS)
            .await
    }

    /// Event details of each alarm. Alarms whose lookup fails or returns
    /// nothing are logged and left out.
    pub async fn fetch_alarm_details(&self, alarm_ids: &[OpaqueId]) -> Vec<Value> {
        info!(count = alarm_ids.len(), "Fetching alarm details");
        let mut details = Vec::with_capacity(alarm_ids.len());

        for alarm_id in alarm_ids {
            let resource = format!("alarms/{}/events", alarm_id);
            match self
                .transport
                .call(ApiBase::Alarm, &resource, HttpMethod::Get, &Params::new())
                .await
            {
                Ok(Value::Null) => warn!(%alarm_id, "No response received for alarm"),
                Ok(detail) => details.push(detail),
                Err(err) => error!(%alarm_id, error = %err, "Error fetching alarm details"),
            }
        }

        details
    }
}
