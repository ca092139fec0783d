//! End-to-end pipeline tests against an in-process fake spreadsheet
//!
//! Draft -> classifier -> store -> sheet push -> sync pull -> admin queue.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use floodcare_common::cache::LocalCache;
use floodcare_common::classifier::TieredClassifier;
use floodcare_common::gateway::{submit_detached, ReportGateway, SheetGateway};
use floodcare_common::intake::{build_report, quick_report, QuickStatus, ReportDraft};
use floodcare_common::merge::{MergePolicy, SyncOutcome};
use floodcare_common::store::FloodStore;
use floodcare_common::sync::SyncLoop;
use floodcare_common::{Category, RiskLevel};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Rows = Arc<Mutex<Vec<Value>>>;

async fn list_rows(State(rows): State<Rows>) -> Json<Vec<Value>> {
    Json(rows.lock().unwrap().clone())
}

async fn append_row(State(rows): State<Rows>, Json(row): Json<Value>) -> &'static str {
    rows.lock().unwrap().push(row);
    "ok"
}

/// Spawn the fake sheet; returns its URL and the shared row list
async fn spawn_sheet() -> (String, Rows) {
    let rows: Rows = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/exec", get(list_rows).post(append_row))
        .with_state(rows.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/exec", addr), rows)
}

fn draft(message: &str, category: Category) -> ReportDraft {
    ReportDraft {
        name: "Aisha".to_string(),
        phone: "0812345678".to_string(),
        dormitory: "หอ 8".to_string(),
        message: message.to_string(),
        category,
        location: None,
    }
}

#[tokio::test]
async fn test_critical_report_reaches_top_of_queue() {
    let dir = tempfile::tempdir().unwrap();
    let (url, rows) = spawn_sheet().await;
    let gateway: Arc<dyn ReportGateway> =
        Arc::new(SheetGateway::new(&url, Duration::from_secs(5)).unwrap());
    let store = FloodStore::open(LocalCache::new(dir.path())).into_shared();
    let classifier = TieredClassifier::keyword_only();

    let older = quick_report(QuickStatus::Hungry, "Somchai", "0899999999", Utc::now()).unwrap();
    store.write().await.add_report(older.clone());
    submit_detached(gateway.clone(), older).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let (report, _) = build_report(draft("เพื่อนหมดสติ", Category::Other), &classifier, Utc::now())
        .await
        .unwrap();
    assert_eq!(report.risk_level, RiskLevel::Critical);
    store.write().await.add_report(report.clone());
    submit_detached(gateway.clone(), report.clone()).await.unwrap();

    assert_eq!(rows.lock().unwrap().len(), 2);
    let queue = store.read().await.priority_queue();
    assert_eq!(queue[0].id, report.id);

    // The cache already holds both reports
    assert_eq!(LocalCache::new(dir.path()).load_reports().len(), 2);
}

#[tokio::test]
async fn test_sync_pull_replaces_store_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let (url, rows) = spawn_sheet().await;
    rows.lock().unwrap().extend([
        serde_json::json!({"id": 1, "name": "First", "risk": "SAFE", "status": "Pending",
            "timestamp": "28/11/2568 09:00:00", "category": "SAFE_CHECKIN", "dorm": "หอ 1",
            "message": "ok", "phone": "-", "location": "-"}),
        serde_json::json!({"id": "2", "name": "Second", "risk": "DANGER", "status": "Solved",
            "timestamp": "28/11/2568 09:05:00", "category": "FOOD", "dorm": "หอ 2",
            "message": "no water", "phone": "081", "location": "6.87, 101.25"}),
        serde_json::json!({"name": "No id"}),
    ]);

    let gateway: Arc<dyn ReportGateway> =
        Arc::new(SheetGateway::new(&url, Duration::from_secs(5)).unwrap());
    let cache = LocalCache::new(dir.path());
    let store = FloodStore::open(cache.clone()).into_shared();
    let sync = SyncLoop::new(gateway, store.clone(), MergePolicy::Replace, Duration::from_secs(10));

    assert_eq!(sync.run_once().await, SyncOutcome::Replaced { count: 2 });

    let guard = store.read().await;
    let ids: Vec<&str> = guard.reports().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert!(guard.reports()[0].is_resolved);
    assert_eq!(guard.reports()[0].risk_level, RiskLevel::High);
    assert!(guard.reports()[0].location.is_some());
    assert!(guard.reports()[1].phone_number.is_none());
    drop(guard);

    assert_eq!(cache.load_reports().len(), 2);
}

#[tokio::test]
async fn test_unreachable_sheet_keeps_last_good_state() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LocalCache::new(dir.path());
    let store = FloodStore::open(cache.clone()).into_shared();
    store
        .write()
        .await
        .add_report(quick_report(QuickStatus::Safe, "A", "081", Utc::now()).unwrap());

    // Nothing listens on the discard port
    let gateway: Arc<dyn ReportGateway> =
        Arc::new(SheetGateway::new("http://127.0.0.1:9/exec", Duration::from_secs(2)).unwrap());
    let sync = SyncLoop::new(gateway, store.clone(), MergePolicy::Replace, Duration::from_secs(10));

    assert_eq!(sync.run_once().await, SyncOutcome::NoUpdate);
    assert_eq!(store.read().await.reports().len(), 1);
    assert_eq!(cache.load_reports().len(), 1);
}

#[tokio::test]
async fn test_union_policy_keeps_unpushed_report() {
    let dir = tempfile::tempdir().unwrap();
    let (url, rows) = spawn_sheet().await;
    rows.lock().unwrap().push(serde_json::json!({"id": "100", "name": "Remote", "risk": "CAUTION"}));

    let gateway: Arc<dyn ReportGateway> =
        Arc::new(SheetGateway::new(&url, Duration::from_secs(5)).unwrap());
    let store = FloodStore::open(LocalCache::new(dir.path())).into_shared();
    let local = quick_report(QuickStatus::Anxious, "Local", "081", Utc::now()).unwrap();
    store.write().await.add_report(local.clone());

    let sync = SyncLoop::new(gateway, store.clone(), MergePolicy::Union, Duration::from_secs(10));
    assert_eq!(sync.run_once().await, SyncOutcome::Merged { count: 2, kept_local: 1 });
    assert!(store.read().await.contains_report(&local.id));
}
