//! Raw API items to report tables.
//!
//! Every function here is pure: the same input always yields the same table.
//! Empty input yields an empty table (no summary row) and a warning; items
//! that do not have the expected object shape are skipped with a warning.
//! The exclusion prefixes and rate divisors are business rules carried over
//! unchanged from the reports customers already receive.

use super::raw::{
    RawAlarm, RawAlarmDetail, RawEntity, RawHost, RawLogSource, RawLogVolume, RawPendingLogSource,
};
use super::types::{
    AlarmDetailRecord, Entity, HostRecord, LogSourceCount, LogVolumeEntry, OpaqueId,
    PendingLogSource, SummaryRecord, Table,
};
use crate::utils::format::format_number;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

/// Entity names with these prefixes are internal or test records.
pub const EXCLUDED_ENTITY_PREFIXES: &[&str] = &["zzz", "NYKUNDE"];

/// Log source types of the SIEM's own agents, left out of customer counts.
pub const VENDOR_LOG_SOURCE_PREFIX: &str = "LogRhythm";

const HOST_IP_IDENTIFIER: &str = "IPAddress";
const MISSING: &str = "N/A";

fn parse_items<T: DeserializeOwned>(items: &[Value], kind: &str) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(kind, index, error = %err, "Skipping malformed item");
                None
            }
        })
        .collect()
}

fn is_vendor_type(name: &str) -> bool {
    name.starts_with(VENDOR_LOG_SOURCE_PREFIX)
}

/// Customer entities in source order, without excluded prefixes.
///
/// Entities without an identifier cannot be reported on and are dropped.
pub fn normalize_entities(items: &[Value]) -> Vec<Entity> {
    if items.is_empty() {
        warn!("No data provided to process entities");
        return Vec::new();
    }

    let entities: Vec<Entity> = parse_items::<RawEntity>(items, "entity")
        .into_iter()
        .filter_map(|raw| {
            let name = raw.name.unwrap_or_default();
            if EXCLUDED_ENTITY_PREFIXES.iter().any(|p| name.starts_with(p)) {
                return None;
            }
            match raw.id {
                Some(id) => Some(Entity { id, name }),
                None => {
                    warn!(entity = %name, "Skipping entity without an id");
                    None
                }
            }
        })
        .collect();

    info!(count = entities.len(), "Processed entity data items");
    entities
}

/// Entities as an exportable table with a `Total Entities` row.
pub fn entities_table(entities: Vec<Entity>) -> Table<Entity> {
    if entities.is_empty() {
        return Table::empty();
    }
    let total = entities.len();
    Table::new(entities, SummaryRecord::labelled::<Entity>("Total Entities", total))
}

/// Hosts with their IP address identifiers.
pub fn normalize_hosts(items: &[Value]) -> Table<HostRecord> {
    if items.is_empty() {
        warn!("No data provided to process host data");
        return Table::empty();
    }

    let hosts: Vec<HostRecord> = parse_items::<RawHost>(items, "host")
        .into_iter()
        .map(|raw| {
            let (entity_id, entity_name) = match raw.entity {
                Some(entity) => (entity.id, entity.name.unwrap_or_default()),
                None => (None, String::new()),
            };
            let ip_addresses = raw
                .host_identifiers
                .unwrap_or_default()
                .into_iter()
                .filter(|identifier| identifier.kind.as_deref() == Some(HOST_IP_IDENTIFIER))
                .filter_map(|identifier| identifier.value)
                .collect();

            HostRecord {
                id: raw.id,
                entity_id,
                entity_name,
                hostname: raw.name.unwrap_or_default(),
                ip_addresses,
            }
        })
        .collect();

    info!(count = hosts.len(), "Processed host data items");
    let total = hosts.len();
    Table::new(hosts, SummaryRecord::labelled::<HostRecord>("Total Hosts", total))
}

/// Log source count per type for `entity`, in first-seen order.
pub fn normalize_log_source_overview(items: &[Value], entity: &str) -> Table<LogSourceCount> {
    if items.is_empty() {
        warn!("No data provided to process log source overview");
        return Table::empty();
    }

    let mut counts: Vec<LogSourceCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in parse_items::<RawLogSource>(items, "log source") {
        let entity_name = raw.entity.and_then(|e| e.name);
        if entity_name.as_deref() != Some(entity) {
            continue;
        }

        let Some(type_name) = raw.log_source_type.and_then(|t| t.name) else {
            continue;
        };
        if type_name.is_empty() || is_vendor_type(&type_name) {
            continue;
        }

        match index.get(&type_name) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(type_name.clone(), counts.len());
                counts.push(LogSourceCount {
                    log_source_type_name: type_name,
                    count: 1,
                });
            }
        }
    }

    let grand_total: usize = counts.iter().map(|c| c.count).sum();
    info!(entity, types = counts.len(), grand_total, "Processed log source overview");
    Table::new(
        counts,
        SummaryRecord::labelled::<LogSourceCount>("Total Log Sources", grand_total),
    )
}

/// Entity named in a collection host string such as `"Entity: Acme, Host: c01"`.
pub fn collection_host_entity(collection_host: &str) -> Option<&str> {
    if !collection_host.contains(": ") {
        return None;
    }
    collection_host
        .split(", ")
        .next()
        .and_then(|segment| segment.split(": ").nth(1))
}

/// Pending log sources whose collection host belongs to `entity`.
pub fn normalize_pending_log_sources(items: &[Value], entity: &str) -> Table<PendingLogSource> {
    if items.is_empty() {
        warn!("No data provided to process pending log sources");
        return Table::empty();
    }

    let pending: Vec<PendingLogSource> = parse_items::<RawPendingLogSource>(items, "pending log source")
        .into_iter()
        .filter(|raw| {
            raw.collection_host
                .as_deref()
                .and_then(collection_host_entity)
                == Some(entity)
        })
        .map(|raw| PendingLogSource {
            name: raw.name.unwrap_or_default(),
            ip_address: raw.ip.unwrap_or_default(),
        })
        .collect();

    let total = pending.len();
    info!(entity, total, "Processed pending log sources");
    Table::new(
        pending,
        SummaryRecord::labelled::<PendingLogSource>("Total Pending Log Sources", total),
    )
}

/// Weekly log volume per type, sorted by type name, with a `Total Logs` row.
///
/// The total comes from the `totalLogs` field of the last raw item rather
/// than from summing the rows, so it includes the excluded vendor types.
pub fn normalize_log_volume(items: &[Value]) -> Table<LogVolumeEntry> {
    if items.is_empty() {
        warn!("No data provided to process log volume");
        return Table::empty();
    }

    let mut entries: Vec<LogVolumeEntry> = parse_items::<RawLogVolume>(items, "log volume")
        .into_iter()
        .flat_map(|raw| raw.log_source_type_info.unwrap_or_default())
        .filter_map(|info| {
            let type_name = info.log_source_type?;
            if is_vendor_type(&type_name) {
                return None;
            }
            let count = info.logs_count.map(|c| c.value()).unwrap_or(0);
            Some(LogVolumeEntry::from_weekly_count(type_name, count))
        })
        .collect();

    entries.sort_by(|a, b| a.log_source_type_name.cmp(&b.log_source_type_name));

    let total_logs = items
        .last()
        .and_then(|last| RawLogVolume::deserialize(last).ok())
        .and_then(|raw| raw.total_logs)
        .map(|c| c.value())
        .unwrap_or(0);
    let total = LogVolumeEntry::from_weekly_count("Total Logs", total_logs);

    info!(types = entries.len(), total_logs, "Processed log volume data");
    Table::new(
        entries,
        SummaryRecord::with_cells::<LogVolumeEntry>(vec![
            total.log_source_type_name.clone(),
            format_number(total.logs_count),
            format_number(total.logs_per_day),
            format_number(total.logs_per_second),
        ]),
    )
}

/// Alarm identifiers from alarm search results, skipping items without one.
pub fn extract_alarm_ids(items: &[Value]) -> Vec<OpaqueId> {
    let ids: Vec<OpaqueId> = parse_items::<RawAlarm>(items, "alarm")
        .into_iter()
        .filter_map(|raw| raw.alarm_id)
        .collect();

    info!(count = ids.len(), "Extracted alarm IDs");
    ids
}

/// Silent log sources named by the first event of each alarm of `entity`.
pub fn normalize_alarm_details(details: &[Value], entity: &str) -> Table<AlarmDetailRecord> {
    if details.is_empty() {
        warn!("No alarm details provided for extraction");
        return Table::empty();
    }

    let mut records = Vec::new();
    for (index, raw) in parse_items::<RawAlarmDetail>(details, "alarm detail")
        .into_iter()
        .enumerate()
    {
        let Some(event) = raw.alarm_events_details.and_then(|events| events.into_iter().next()) else {
            warn!(index, "Alarm detail has no events");
            continue;
        };
        if event.entity_name.as_deref().unwrap_or(MISSING) != entity {
            continue;
        }

        records.push(AlarmDetailRecord {
            log_source_name: event.log_source_name.unwrap_or_else(|| MISSING.to_string()),
            log_source_host_name: event
                .log_source_host_name
                .unwrap_or_else(|| MISSING.to_string()),
            log_date: event.log_date.unwrap_or_else(|| MISSING.to_string()),
        });
    }

    let total = records.len();
    info!(entity, total, "Processed alarm details");
    Table::new(
        records,
        SummaryRecord::labelled::<AlarmDetailRecord>("Total Alarms", total),
    )
}
