//! End-to-end report run for one entity against a mock SIEM.

use chrono::NaiveDate;
use lr_report_tools::api::{ApiClient, EmptyPagePolicy, SiemApi};
use lr_report_tools::config::ApiConfig;
use lr_report_tools::export::{read_table, CsvSink};
use lr_report_tools::report::{generate_entity_report, Entity, OpaqueId, ReportSettings, TableKind};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::Value;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn client_for(server: &ServerGuard) -> ApiClient {
    let base = server.url();
    ApiClient::new(&ApiConfig {
        admin_url: format!("{}/admin", base),
        metrics_url: format!("{}/metrics", base),
        alarm_url: format!("{}/alarms", base),
        token: "t0ken".to_string(),
        skip_verify: false,
        timeout: Duration::from_secs(5),
        empty_page_policy: EmptyPagePolicy::Complete,
    })
    .unwrap()
}

async fn mock_get(server: &mut ServerGuard, path: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer t0ken")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

fn acme() -> Entity {
    Entity {
        id: OpaqueId::Number(7),
        name: "Acme".to_string(),
    }
}

#[tokio::test]
async fn test_full_report_for_entity() {
    let mut server = Server::new_async().await;
    let _hosts = mock_get(
        &mut server,
        "/admin/hosts/",
        r#"[{"id": 11, "name": "dc01", "entity": {"id": 7, "name": "Acme"},
             "hostIdentifiers": [{"type": "IPAddress", "value": "10.1.1.1"}]}]"#,
    )
    .await;
    let _log_sources = mock_get(
        &mut server,
        "/admin/logsources/",
        r#"[{"entity": {"name": "Acme"}, "logSourceType": {"name": "Firewall"}},
            {"entity": {"name": "Acme"}, "logSourceType": {"name": "LogRhythm Agent"}},
            {"entity": {"name": "Globex"}, "logSourceType": {"name": "Firewall"}},
            {"entity": {"name": "Acme"}, "logSourceType": {"name": "Firewall"}}]"#,
    )
    .await;
    let _pending = mock_get(
        &mut server,
        "/admin/logsources-request/",
        r#"[{"name": "new-fw", "ip": "10.1.1.9", "collectionHost": "Entity: Acme, Host: c01"},
            {"name": "other", "ip": "10.2.2.2", "collectionHost": "Entity: Globex, Host: c02"}]"#,
    )
    .await;
    let _alarms = mock_get(
        &mut server,
        "/alarms/alarms/",
        r#"{"alarmsSearchDetails": [{"alarmId": 501}, {"alarmId": 502}, {"noId": true}]}"#,
    )
    .await;
    let _alarm_501 = mock_get(
        &mut server,
        "/alarms/alarms/501/events",
        r#"{"alarmEventsDetails": [{"entityName": "Acme", "logSourceName": "fw01",
             "logSourceHostName": "fw01.acme", "logDate": "2025-03-04T22:10:00"}]}"#,
    )
    .await;
    let _alarm_502 = server
        .mock("GET", "/alarms/alarms/502/events")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;
    let _volume = server
        .mock("POST", "/metrics/logvolume/")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "minDate": "2025-02-26",
            "maxDate": "2025-03-05",
            "groupBy": {"Ids": [7]}
        })))
        .with_status(200)
        .with_body(
            r#"{"data": [{"logSourceTypeInfo": [{"logSourceType": "Firewall", "logsCount": 70000}],
                          "totalLogs": 70000}]}"#,
        )
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let settings = ReportSettings::new(dir.path(), today);
    let api = SiemApi::new(client_for(&server));

    let report = generate_entity_report(&api, &CsvSink, &acme(), &settings)
        .await
        .unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert!(report.is_complete());
    assert_eq!(report.written.len(), 5);

    let entity_dir = dir.path().join("Acme");
    let overview = read_table(&entity_dir.join("Acme_log_source_overview.csv")).unwrap();
    assert_eq!(overview.rows, vec![vec!["Firewall", "2"], vec!["Total Log Sources", "2"]]);

    let volume = read_table(&entity_dir.join("Acme_log_volume.csv")).unwrap();
    assert_eq!(volume.rows[0], vec!["Firewall", "70,000", "10,000", "0"]);

    let missing = read_table(&entity_dir.join("Acme_missing_logs.csv")).unwrap();
    assert_eq!(
        missing.rows,
        vec![
            vec!["fw01", "fw01.acme", "2025-03-04T22:10:00"],
            vec!["Total Alarms", "", "1"],
        ]
    );

    let pending = read_table(&entity_dir.join("Acme_pending_log_sources.csv")).unwrap();
    assert_eq!(pending.rows, vec![vec!["new-fw", "10.1.1.9"], vec!["Total Pending Log Sources", "1"]]);

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(entity_dir.join("Acme_manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["deck"], "Acme_Q3DIRTogMDR.pptx");
    assert_eq!(manifest["placeholders"][0]["value"], "Acme");
    assert_eq!(manifest["placeholders"][1]["value"], "05/03/2025");
    assert_eq!(manifest["tables"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_report_continues_when_api_is_down() {
    let mut server = Server::new_async().await;
    let _get = server
        .mock("GET", Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let _post = server
        .mock("POST", Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let settings = ReportSettings::new(dir.path(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
    let api = SiemApi::new(client_for(&server));

    let report = generate_entity_report(&api, &CsvSink, &acme(), &settings)
        .await
        .unwrap();

    let failed: Vec<TableKind> = report.failures.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(failed, TableKind::ALL.to_vec());
    assert!(report.written.is_empty());

    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("Acme").join("Acme_manifest.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["tables"], serde_json::json!([]));
}
