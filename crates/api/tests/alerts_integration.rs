//! Integration tests for the alert lifecycle and action log.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

/// Raise one alert through the scoring endpoint and return its id.
async fn raise_alert(app: &TestApp, order_id: &str) -> i64 {
    let (status, body) = app.predict(order_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["will_miss_sla"], true);

    let (status, alerts) = app.get("/api/v1/alerts?status=open").await;
    assert_eq!(status, StatusCode::OK);
    alerts
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["order_id"] == order_id)
        .and_then(|a| a["id"].as_i64())
        .expect("alert not listed")
}

#[tokio::test]
async fn test_acknowledge_then_resolve() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-100").await;

    let (status, body) = app
        .post(&format!("/api/v1/alerts/{}/ack", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["alert"]["status"], "acknowledged");
    assert!(body["alert"]["acknowledged_at"].is_string());

    let (status, body) = app
        .post(
            &format!("/api/v1/alerts/{}/resolve", id),
            json!({ "actual_sla_missed": true, "resolution_notes": "  rerouted via hub B  " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"]["status"], "resolved");
    assert_eq!(body["alert"]["actual_sla_missed"], true);
    assert_eq!(body["alert"]["resolution_notes"], "rerouted via hub B");
}

#[tokio::test]
async fn test_resolve_directly_from_open() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-101").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/alerts/{}/resolve", id),
            json!({ "actual_sla_missed": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"]["status"], "resolved");
    assert!(body["alert"]["acknowledged_at"].is_null());
    assert!(body["alert"]["resolution_notes"].is_null());
}

#[tokio::test]
async fn test_transitions_on_resolved_alert_conflict() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-102").await;

    let resolve = json!({ "actual_sla_missed": false });
    let (status, _) = app
        .post(&format!("/api/v1/alerts/{}/resolve", id), resolve.clone())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(&format!("/api/v1/alerts/{}/ack", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, _) = app
        .post(&format!("/api/v1/alerts/{}/resolve", id), resolve)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_acknowledge_twice_conflicts() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-103").await;

    let uri = format!("/api/v1/alerts/{}/ack", id);
    assert_eq!(app.post(&uri, json!({})).await.0, StatusCode::OK);
    assert_eq!(app.post(&uri, json!({})).await.0, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_alert_is_not_found() {
    let app = TestApp::new(0.93).await;

    let (status, body) = app.post("/api/v1/alerts/9999/ack", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = app
        .post(
            "/api/v1/alerts/9999/resolve",
            json!({ "actual_sla_missed": true }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/v1/alerts/9999/actions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/v1/alerts/9999/actions",
            json!({ "action_type": "REROUTE" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_actions_are_listed_newest_first() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-104").await;
    let uri = format!("/api/v1/alerts/{}/actions", id);

    let (status, body) = app
        .post(&uri, json!({ "action_type": " REROUTE ", "payload": { "hub": "B" } }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["alert_id"], id);
    assert_eq!(body["action_type"], "REROUTE");
    assert_eq!(body["payload"]["hub"], "B");

    let (status, body) = app.post(&uri, json!({ "action_type": "ESCALATE" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("payload").is_none());

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    let actions = body.as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["action_type"], "ESCALATE");
    assert_eq!(actions[1]["action_type"], "REROUTE");
}

#[tokio::test]
async fn test_actions_allowed_after_resolution() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-105").await;

    app.post(
        &format!("/api/v1/alerts/{}/resolve", id),
        json!({ "actual_sla_missed": true }),
    )
    .await;

    let (status, _) = app
        .post(
            &format!("/api/v1/alerts/{}/actions", id),
            json!({ "action_type": "CUSTOMER_CALLED" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_blank_action_type_rejected() {
    let app = TestApp::new(0.93).await;
    let id = raise_alert(&app, "ORD-106").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/alerts/{}/actions", id),
            json!({ "action_type": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = TestApp::new(0.93).await;
    let first = raise_alert(&app, "ORD-107").await;
    raise_alert(&app, "ORD-108").await;

    app.post(&format!("/api/v1/alerts/{}/ack", first), json!({}))
        .await;

    let (_, open) = app.get("/api/v1/alerts?status=open").await;
    let open = open.as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["order_id"], "ORD-108");

    let (_, acked) = app.get("/api/v1/alerts?status=acknowledged").await;
    assert_eq!(acked.as_array().unwrap().len(), 1);

    let (_, all) = app.get("/api/v1/alerts").await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["order_id"], "ORD-108");
}

#[tokio::test]
async fn test_list_limit_bounds() {
    let app = TestApp::new(0.93).await;

    let (status, _) = app.get("/api/v1/alerts?limit=201").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/alerts?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/v1/alerts?limit=200").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_returns_json_validation_error() {
    let app = TestApp::new(0.93).await;

    for uri in [
        "/api/v1/alerts?status=closed",
        "/api/v1/alerts?limit=lots",
        "/api/v1/logs?limit=-",
        "/api/v1/stats/trends?days=week",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "validation_error", "{}", uri);
        assert!(body["message"].is_string(), "{}", uri);
    }
}
