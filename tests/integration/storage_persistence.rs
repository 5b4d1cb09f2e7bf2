//! Integration tests for the SQLite store
//!
//! These tests verify that:
//! - Rows round-trip through the schema (targets, settings, logs, alerts)
//! - Inactive targets are excluded from the cycle's read
//! - A full engine cycle works against the persistent store

use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;
use vigil::engine::Engine;
use vigil::storage::sqlite::SqliteStore;
use vigil::storage::{AlertChannel, AlertRecord, AlertSettings, DeliveryOutcome, LogEntry, TargetStore, TargetUpdate};
use vigil::TargetStatus;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

async fn open_store(dir: &tempfile::TempDir) -> SqliteStore {
    SqliteStore::new(dir.path().join("monitor.db")).await.unwrap()
}

#[tokio::test]
async fn targets_round_trip_and_inactive_are_excluded() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .insert_target(&make_target("u-1", "https://example.com", TargetStatus::Pending, 100.0))
        .await
        .unwrap();

    let mut inactive = make_target("u-2", "https://example.org", TargetStatus::Up, 99.0);
    inactive.is_active = false;
    store.insert_target(&inactive).await.unwrap();

    let targets = store.active_targets().await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, "u-1");
    assert_eq!(targets[0].status, TargetStatus::Pending);
    assert_eq!(targets[0].uptime, 100.0);
    assert_eq!(targets[0].down_since, None);
}

#[tokio::test]
async fn target_update_persists_all_cycle_fields() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .insert_target(&make_target("u-1", "https://example.com", TargetStatus::Up, 100.0))
        .await
        .unwrap();

    let now = Utc::now();
    store
        .update_target(TargetUpdate {
            id: "u-1".to_string(),
            status: TargetStatus::Down,
            response_time_ms: 1234,
            uptime: 99.0,
            last_checked: now,
            down_since: Some(now),
        })
        .await
        .unwrap();

    let target = &store.active_targets().await.unwrap()[0];
    assert_eq!(target.status, TargetStatus::Down);
    assert_eq!(target.response_time_ms, Some(1234));
    assert!((target.uptime - 99.0).abs() < 1e-9);
    // millisecond precision survives the round trip
    assert_eq!(
        target.last_checked.unwrap().timestamp_millis(),
        now.timestamp_millis()
    );
    assert_eq!(
        target.down_since.unwrap().timestamp_millis(),
        now.timestamp_millis()
    );
}

#[tokio::test]
async fn updating_an_unknown_target_fails() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    let result = store
        .update_target(TargetUpdate {
            id: "ghost".to_string(),
            status: TargetStatus::Up,
            response_time_ms: 1,
            uptime: 100.0,
            last_checked: Utc::now(),
            down_since: None,
        })
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn settings_round_trip() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    assert!(store.alert_settings().await.unwrap().is_none());

    store
        .put_settings(&AlertSettings {
            alert_threshold: 92.5,
            recipients: vec!["a@example.com".to_string(), "b@example.com".to_string()],
        })
        .await
        .unwrap();

    let settings = store.alert_settings().await.unwrap().unwrap();
    assert_eq!(settings.alert_threshold, 92.5);
    assert_eq!(settings.recipients.len(), 2);

    // second write replaces the snapshot
    store
        .put_settings(&AlertSettings {
            alert_threshold: 80.0,
            recipients: vec![],
        })
        .await
        .unwrap();

    let settings = store.alert_settings().await.unwrap().unwrap();
    assert_eq!(settings.alert_threshold, 80.0);
    assert!(settings.recipients.is_empty());
}

#[tokio::test]
async fn logs_append_and_read_back_newest_first() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    let target = make_target("u-1", "https://example.com", TargetStatus::Up, 100.0);

    for (i, uptime) in [99.0, 98.01].iter().enumerate() {
        store
            .append_log(LogEntry {
                url_id: target.id.clone(),
                url_name: target.display_name().to_string(),
                status: TargetStatus::Down,
                response_time_ms: 10 + i as u64,
                status_code: 0,
                uptime: *uptime,
                details: "Site is down (no response)".to_string(),
                timestamp: Utc::now() + chrono::Duration::milliseconds(i as i64),
            })
            .await
            .unwrap();
    }

    let logs = store.recent_logs("u-1", 10).await.unwrap();
    assert_eq!(logs.len(), 2);
    // newest first
    assert!((logs[0].uptime - 98.01).abs() < 1e-9);
    assert!((logs[1].uptime - 99.0).abs() < 1e-9);
    assert_eq!(logs[0].url_name, "Test u-1");

    let limited = store.recent_logs("u-1", 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn alert_records_round_trip() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir).await;

    store
        .append_alert(AlertRecord {
            url_id: "u-1".to_string(),
            channel: AlertChannel::Email,
            outcome: DeliveryOutcome::Failed,
            details: "email API rejected message with status 400".to_string(),
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    let alerts = store.alerts_for("u-1").await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].channel, AlertChannel::Email);
    assert_eq!(alerts[0].outcome, DeliveryOutcome::Failed);
}

#[tokio::test]
async fn full_cycle_runs_against_the_sqlite_store() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let dir = tempdir().unwrap();
    let store = Arc::new(open_store(&dir).await);
    store
        .insert_target(&make_target("u-1", &mock_server.uri(), TargetStatus::Pending, 95.0))
        .await
        .unwrap();

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    assert_eq!(report.checked, 1);

    let target = &store.active_targets().await.unwrap()[0];
    assert_eq!(target.status, TargetStatus::Up);
    assert!((target.uptime - 95.05).abs() < 1e-9);

    let logs = store.recent_logs("u-1", 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].details, "Site is up");
}
