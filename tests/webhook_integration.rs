//! Integration tests for the webhook endpoint
//!
//! These drive the full axum router against a scripted gateway and an
//! in-memory context store; no network access is involved.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use bybit_webhook::common::types::{PositionInfo, Side, TradeKey};
use bybit_webhook::executor::{ContextStore, Dispatcher, MemoryContextStore};
use bybit_webhook::server::{AppState, WebhookServer};

use common::{payloads, FailingStore, RecordingLedger, RecordingNotifier, StubGateway};

struct TestApp {
    router: axum::Router,
    gateway: Arc<StubGateway>,
    store: Arc<MemoryContextStore>,
    notifier: Arc<RecordingNotifier>,
    ledger: Arc<RecordingLedger>,
}

fn build_app(gateway: StubGateway) -> TestApp {
    let gateway = Arc::new(gateway);
    let store = Arc::new(MemoryContextStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let ledger = Arc::new(RecordingLedger::default());

    let dispatcher = Dispatcher::new(gateway.clone(), store.clone(), dec!(1));
    let state = Arc::new(AppState {
        dispatcher,
        notifier: notifier.clone(),
        ledger: ledger.clone(),
    });
    let router = WebhookServer::new(state).router();

    TestApp {
        router,
        gateway,
        store,
        notifier,
        ledger,
    }
}

async fn post_webhook(app: &TestApp, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_app(StubGateway::default());
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_payload_without_action_is_ignored() {
    let app = build_app(StubGateway::default());

    let (status, body) = post_webhook(&app, payloads::NO_ACTION).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    // shared alert source noise never alarms the operator channel
    assert!(app.notifier.messages.lock().unwrap().is_empty());
    assert!(app.gateway.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_action_is_ignored() {
    let app = build_app(StubGateway::default());

    let payload = r#"{"action": "SOME_NEW_THING", "ticker": "BTCUSDT"}"#;
    let (status, body) = post_webhook(&app, payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn test_incomplete_new_pattern_is_ignored() {
    let app = build_app(StubGateway::default());

    let payload = r#"{"action": "NEW_PATTERN", "ticker": "BTCUSDT.P", "direction": "long"}"#;
    let (status, body) = post_webhook(&app, payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    assert!(app.gateway.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_new_pattern_places_order_and_notifies() {
    let app = build_app(StubGateway::default());

    let (status, body) = post_webhook(&app, payloads::NEW_PATTERN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let submitted = app.gateway.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].symbol, "BTCUSDT");
    assert_eq!(submitted[0].qty, "0.2");
    assert_eq!(submitted[0].trigger_price.as_deref(), Some("100.00"));
    drop(submitted);

    let context = app
        .store
        .get(&TradeKey::new("BTCUSDT", 1))
        .await
        .unwrap()
        .expect("context stored");
    assert_eq!(context.stop_loss, "95.00");
    assert_eq!(context.take_profit, "110.00");

    let messages = app.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("✅"), "got: {}", messages[0]);
}

#[tokio::test]
async fn test_occupied_slot_is_rejected_not_overwritten() {
    let app = build_app(StubGateway::default());

    post_webhook(&app, payloads::NEW_PATTERN).await;
    let (status, body) = post_webhook(&app, payloads::NEW_PATTERN).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    // only the first signal reached the venue
    assert_eq!(app.gateway.submitted.lock().unwrap().len(), 1);

    let messages = app.notifier.messages.lock().unwrap();
    assert!(messages.last().unwrap().starts_with("⚠️"));
}

#[tokio::test]
async fn test_venue_rejection_answers_500_and_notifies() {
    let app = build_app(StubGateway {
        reject_submit: Some((10001, "position idx not match position mode".to_string())),
        ..StubGateway::default()
    });

    let (status, body) = post_webhook(&app, payloads::NEW_PATTERN).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("10001"));
    assert!(error.contains("position idx not match"));

    // nothing stored on rejection
    assert!(app
        .store
        .get(&TradeKey::new("BTCUSDT", 1))
        .await
        .unwrap()
        .is_none());

    let messages = app.notifier.messages.lock().unwrap();
    assert!(messages.last().unwrap().starts_with("❌ ERROR:"));
}

#[tokio::test]
async fn test_store_outage_answers_500_not_noop() {
    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = Dispatcher::new(
        Arc::new(StubGateway::default()),
        Arc::new(FailingStore),
        dec!(1),
    );
    let state = Arc::new(AppState {
        dispatcher,
        notifier: notifier.clone(),
        ledger: Arc::new(RecordingLedger::default()),
    });
    let router = WebhookServer::new(state).router();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(payloads::INVALIDATE))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    // an unreachable store is a fault, never a calm "nothing to cancel"
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("store unavailable"));

    let messages = notifier.messages.lock().unwrap();
    assert!(messages.last().unwrap().starts_with("❌ ERROR:"));
}

#[tokio::test]
async fn test_full_lifecycle_logs_pnl_row() {
    let app = build_app(StubGateway::default());

    post_webhook(&app, payloads::NEW_PATTERN).await;
    let (status, body) = post_webhook(&app, payloads::TRADE_CLOSED).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let rows = app.ledger.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pnl_percent, dec!(10.00));
    assert_eq!(rows[0].entry_price, "100.00");
    assert_eq!(rows[0].outcome.as_deref(), Some("take_profit"));
    drop(rows);

    // key released for the next pattern
    assert!(app
        .store
        .get(&TradeKey::new("BTCUSDT", 1))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_invalidate_is_calm() {
    let app = build_app(StubGateway::default());

    post_webhook(&app, payloads::NEW_PATTERN).await;
    let (first_status, _) = post_webhook(&app, payloads::INVALIDATE).await;
    let (second_status, second_body) = post_webhook(&app, payloads::INVALIDATE).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second_body["status"], "success");
    // exactly one cancellation reached the venue
    assert_eq!(app.gateway.cancelled.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_close_by_age_without_position_clears_quietly() {
    let app = build_app(StubGateway::default());

    post_webhook(&app, payloads::NEW_PATTERN).await;

    let payload = json!({
        "action": "CLOSE_BY_AGE",
        "ticker": "BTCUSDT.P",
        "positionIdx": 1
    });
    let (status, body) = post_webhook(&app, &payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    // only the original conditional was ever submitted
    assert_eq!(app.gateway.submitted.lock().unwrap().len(), 1);
    assert!(app
        .store
        .get(&TradeKey::new("BTCUSDT", 1))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_close_by_age_closes_live_position_reduce_only() {
    let app = build_app(StubGateway {
        live_position: Some(PositionInfo {
            symbol: "BTCUSDT".to_string(),
            slot: 1,
            side: Side::Buy,
            size: dec!(0.2),
        }),
        last_price: dec!(108),
        ..StubGateway::default()
    });

    post_webhook(&app, payloads::NEW_PATTERN).await;

    let payload = json!({
        "action": "CLOSE_BY_AGE",
        "ticker": "BTCUSDT.P",
        "positionIdx": 1
    });
    let (status, _) = post_webhook(&app, &payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let submitted = app.gateway.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 2);
    let close = &submitted[1];
    assert_eq!(close.side, Side::Sell);
    assert_eq!(close.qty, "0.2");
    assert!(close.reduce_only);
    drop(submitted);

    // logged against the ticker read, not the original target
    let rows = app.ledger.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].close_price, "108");
    assert_eq!(rows[0].pnl_percent, dec!(8.00));
}
