//! Raw API item shapes.
//!
//! Every field is optional: the normalizers decide what a missing value means.

use super::types::OpaqueId;
use serde::Deserialize;

/// `{id, name}` reference embedded in many items.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    pub id: Option<OpaqueId>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawEntity {
    pub id: Option<OpaqueId>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawHost {
    pub id: Option<OpaqueId>,
    pub entity: Option<NamedRef>,
    pub name: Option<String>,
    pub host_identifiers: Option<Vec<RawHostIdentifier>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawHostIdentifier {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLogSource {
    pub entity: Option<NamedRef>,
    pub log_source_type: Option<NamedRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPendingLogSource {
    pub name: Option<String>,
    pub ip: Option<String>,
    /// Free text such as `"Entity: Acme, Host: collector01"`.
    pub collection_host: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLogVolume {
    pub log_source_type_info: Option<Vec<RawLogTypeVolume>>,
    pub total_logs: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLogTypeVolume {
    pub log_source_type: Option<String>,
    pub logs_count: Option<Count>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAlarm {
    pub alarm_id: Option<OpaqueId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAlarmDetail {
    pub alarm_events_details: Option<Vec<RawAlarmEvent>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAlarmEvent {
    pub entity_name: Option<String>,
    pub log_source_name: Option<String>,
    pub log_source_host_name: Option<String>,
    pub log_date: Option<String>,
}

/// A count the metrics API sends either as a number or as numeric text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl Count {
    /// Non-numeric and negative values count as zero; fractions truncate.
    pub fn value(&self) -> u64 {
        match self {
            Self::Integer(n) => *n,
            Self::Float(f) if f.is_finite() && *f > 0.0 => *f as u64,
            Self::Float(_) => 0,
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| Self::Float(f).value()))
                    .unwrap_or(0)
            }
        }
    }
}
