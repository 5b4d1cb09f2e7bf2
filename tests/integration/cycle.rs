//! End-to-end tests for the check cycle
//!
//! These tests verify that:
//! - One cycle persists the target update and exactly one log row per target
//! - Status transitions and `down_since` behave per the tracker rules
//! - One bad target never blocks the rest of the fleet
//! - Store write failures are contained to the affected target

use std::sync::Arc;

use chrono::Utc;
use pretty_assertions::assert_eq;
use vigil::engine::Engine;
use vigil::storage::memory::MemoryStore;
use vigil::TargetStatus;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn cycle_updates_target_and_appends_one_log_row() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert_target(make_target("u-1", &mock_server.uri(), TargetStatus::Pending, 95.0))
        .await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    assert_eq!(report.checked, 1);
    assert_eq!(report.results[0].status, TargetStatus::Up);

    let target = store.target("u-1").await.unwrap();
    assert_eq!(target.status, TargetStatus::Up);
    assert!((target.uptime - 95.05).abs() < 1e-9);
    assert!(target.last_checked.is_some());
    assert!(target.response_time_ms.is_some());
    assert_eq!(target.down_since, None);

    let logs = store.logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].url_id, "u-1");
    assert_eq!(logs[0].url_name, "Test u-1");
    assert_eq!(logs[0].status, TargetStatus::Up);
    assert_eq!(logs[0].status_code, 200);
    assert_eq!(logs[0].details, "Site is up");
    assert!((logs[0].uptime - 95.05).abs() < 1e-9);
}

#[tokio::test]
async fn failing_check_marks_target_down_and_stamps_down_since() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_target(make_target(
            "u-1",
            "http://127.0.0.1:9/",
            TargetStatus::Up,
            100.0,
        ))
        .await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    assert_eq!(report.results[0].status, TargetStatus::Down);

    let target = store.target("u-1").await.unwrap();
    assert_eq!(target.status, TargetStatus::Down);
    assert!((target.uptime - 99.0).abs() < 1e-9);
    assert!(target.down_since.is_some());

    let logs = store.logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].details, "Site is down (no response)");
    assert_eq!(logs[0].status_code, 0);
}

#[tokio::test]
async fn down_since_is_retained_across_cycles_while_down() {
    let store = Arc::new(MemoryStore::new());
    let outage_start = Utc::now() - chrono::Duration::minutes(30);
    let mut target = make_target("u-1", "http://127.0.0.1:9/", TargetStatus::Down, 95.0);
    target.down_since = Some(outage_start);
    store.insert_target(target).await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    engine.run_cycle().await;

    let target = store.target("u-1").await.unwrap();
    assert_eq!(target.status, TargetStatus::Down);
    assert_eq!(target.down_since, Some(outage_start));
}

#[tokio::test]
async fn recovery_clears_down_since() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut target = make_target("u-1", &mock_server.uri(), TargetStatus::Down, 85.0);
    target.down_since = Some(Utc::now() - chrono::Duration::minutes(30));
    store.insert_target(target).await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    engine.run_cycle().await;

    let target = store.target("u-1").await.unwrap();
    assert_eq!(target.status, TargetStatus::Up);
    assert_eq!(target.down_since, None);
}

#[tokio::test]
async fn one_bad_target_does_not_block_the_fleet() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert_target(make_target("good-1", &mock_server.uri(), TargetStatus::Up, 100.0))
        .await;
    store
        .insert_target(make_target(
            "bad",
            "http://127.0.0.1:9/",
            TargetStatus::Up,
            100.0,
        ))
        .await;
    store
        .insert_target(make_target("good-2", &mock_server.uri(), TargetStatus::Up, 100.0))
        .await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    assert_eq!(report.checked, 3);
    assert_eq!(store.logs().await.len(), 3);

    // every target got its update, including the unreachable one
    assert_eq!(store.target("good-1").await.unwrap().status, TargetStatus::Up);
    assert_eq!(store.target("good-2").await.unwrap().status, TargetStatus::Up);
    assert_eq!(store.target("bad").await.unwrap().status, TargetStatus::Down);
}

#[tokio::test]
async fn store_write_failure_is_contained_to_one_target() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let memory = Arc::new(MemoryStore::new());
    memory
        .insert_target(make_target("flaky", &mock_server.uri(), TargetStatus::Up, 100.0))
        .await;
    memory
        .insert_target(make_target("healthy", &mock_server.uri(), TargetStatus::Pending, 100.0))
        .await;

    let store = Arc::new(FlakyStore::new(memory.clone(), &["flaky"]));

    let engine = Engine::new(store, None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    // the cycle itself never fails
    assert_eq!(report.checked, 2);

    // the healthy target was updated despite the other write failing
    let healthy = memory.target("healthy").await.unwrap();
    assert_eq!(healthy.status, TargetStatus::Up);

    // log append is independent of the failed target update
    assert_eq!(memory.logs().await.len(), 2);
}

#[tokio::test]
async fn inactive_targets_are_skipped() {
    let store = Arc::new(MemoryStore::new());
    let mut inactive = make_target("off", "http://127.0.0.1:9/", TargetStatus::Up, 100.0);
    inactive.is_active = false;
    store.insert_target(inactive).await;

    let engine = Engine::new(store.clone(), None, test_monitor_config()).unwrap();
    let report = engine.run_cycle().await;

    assert_eq!(report.checked, 0);
    assert!(store.logs().await.is_empty());
}
