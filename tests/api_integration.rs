//! Integration tests for the geotargeting API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use std::time::Duration as StdDuration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_test::TestServer;
use chrono::Duration;
use serde_json::json;
use tokio_test::assert_ok;
use tower::ServiceExt;

use geotargeting::api::{AppState, MAX_UNREGISTERED_INSIDE, router};
use geotargeting::config::GeofenceConfig;
use geotargeting::monitor::Monitor;
use geotargeting::ring::build_geofence;

fn create_state(dwell_timeout: Duration) -> AppState {
    let config = GeofenceConfig::default();
    let geofence = build_geofence(&config.ring).unwrap();
    let monitor = Monitor::new(geofence.into_regions(), dwell_timeout).unwrap();
    AppState::new(monitor)
}

fn create_test_server(dwell_timeout: Duration) -> TestServer {
    assert_ok!(TestServer::new(router(create_state(dwell_timeout))))
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server(Duration::seconds(10));

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_get_regions_lists_primary_then_ring() {
    let server = create_test_server(Duration::seconds(10));

    let response = server.get("/regions").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let regions = body.as_array().unwrap();
    assert_eq!(regions.len(), 7);

    assert_eq!(regions[0]["identifier"], "primary");
    assert_eq!(regions[0]["radius_meters"], 1000.0);

    let ids: Vec<&str> = regions[1..]
        .iter()
        .map(|r| r["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "kissing60",
            "kissing120",
            "kissing180",
            "kissing240",
            "kissing300",
            "kissing360"
        ]
    );
    for region in &regions[1..] {
        assert_eq!(region["radius_meters"], 500.0);
    }

    let origin_lon = regions[0]["center"]["longitude"].as_f64().unwrap();
    let west_lon = regions[3]["center"]["longitude"].as_f64().unwrap();
    assert!(west_lon < origin_lon);
}

#[tokio::test]
async fn test_enter_and_exit() {
    let server = create_test_server(Duration::seconds(10));

    let response = server
        .post("/regions/enter")
        .json(&json!({ "identifier": "kissing60" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "entered");
    assert_eq!(body["identifier"], "kissing60");

    let inside: serde_json::Value = server.get("/regions/inside").await.json();
    assert_eq!(inside.as_array().unwrap().len(), 1);
    assert_eq!(inside[0]["identifier"], "kissing60");

    let response = server
        .post("/regions/exit")
        .json(&json!({ "identifier": "kissing60" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["notification"]["kind"], "exited");

    let inside: serde_json::Value = server.get("/regions/inside").await.json();
    assert!(inside.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_exit_unknown_region_is_noop() {
    let server = create_test_server(Duration::seconds(10));

    let response = server
        .post("/regions/exit")
        .json(&json!({ "identifier": "nowhere" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["notification"].is_null());
}

#[tokio::test]
async fn test_location_update_evicts_after_dwell_timeout() {
    let server = create_test_server(Duration::milliseconds(1));

    server
        .post("/regions/enter")
        .json(&json!({ "identifier": "primary" }))
        .await
        .assert_status_ok();

    tokio::time::sleep(StdDuration::from_millis(20)).await;

    let response = server
        .post("/location")
        .json(&json!({ "latitude": 37.703026, "longitude": -121.759735 }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    let expired = body["expired"].as_array().unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0]["kind"], "dwell_expired");
    assert_eq!(expired[0]["identifier"], "primary");

    // Region stays registered after eviction.
    let regions: serde_json::Value = server.get("/regions").await.json();
    assert_eq!(regions.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_location_update_within_timeout_keeps_region() {
    let server = create_test_server(Duration::seconds(600));

    server
        .post("/regions/enter")
        .json(&json!({ "identifier": "kissing180" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/location")
        .json(&json!({ "latitude": 37.70, "longitude": -121.78 }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert!(body["expired"].as_array().unwrap().is_empty());

    let inside: serde_json::Value = server.get("/regions/inside").await.json();
    assert_eq!(inside[0]["identifier"], "kissing180");
}

#[tokio::test]
async fn test_location_update_rejects_invalid_coordinate() {
    let server = create_test_server(Duration::seconds(10));

    let response = server
        .post("/location")
        .json(&json!({ "latitude": 123.0, "longitude": 0.0 }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_location_before_and_after_update() {
    let server = create_test_server(Duration::seconds(10));

    let response = server.get("/location").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["location"].is_null());
    assert!(body["updated_at"].is_null());
    assert_eq!(body["dwell_timeout_secs"], 10);

    server
        .post("/location")
        .json(&json!({ "latitude": 37.703026, "longitude": -121.759735 }))
        .await
        .assert_status_ok();

    let body: serde_json::Value = server.get("/location").await.json();
    assert_eq!(body["location"]["latitude"], 37.703026);
    assert_eq!(body["location"]["longitude"], -121.759735);
    assert!(body["updated_at"].is_string());
}

#[tokio::test]
async fn test_enter_caps_unregistered_regions() {
    let server = create_test_server(Duration::seconds(10));

    for i in 0..MAX_UNREGISTERED_INSIDE {
        server
            .post("/regions/enter")
            .json(&json!({ "identifier": format!("stray-{i}") }))
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/regions/enter")
        .json(&json!({ "identifier": "one-too-many" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Re-entering a tracked stray and entering a geofence region still work.
    server
        .post("/regions/enter")
        .json(&json!({ "identifier": "stray-0" }))
        .await
        .assert_status_ok();
    server
        .post("/regions/enter")
        .json(&json!({ "identifier": "kissing60" }))
        .await
        .assert_status_ok();

    // Exiting a stray frees a slot.
    server
        .post("/regions/exit")
        .json(&json!({ "identifier": "stray-1" }))
        .await
        .assert_status_ok();
    server
        .post("/regions/enter")
        .json(&json!({ "identifier": "one-too-many" }))
        .await
        .assert_status_ok();

    let inside: serde_json::Value = server.get("/regions/inside").await.json();
    assert_eq!(inside.as_array().unwrap().len(), MAX_UNREGISTERED_INSIDE + 1);
}

#[tokio::test]
async fn test_recent_notifications() {
    let server = create_test_server(Duration::seconds(10));

    for id in ["kissing60", "kissing120", "kissing180"] {
        server
            .post("/regions/enter")
            .json(&json!({ "identifier": id }))
            .await
            .assert_status_ok();
    }
    server
        .post("/regions/exit")
        .json(&json!({ "identifier": "kissing120" }))
        .await
        .assert_status_ok();

    let response = server.get("/notifications/recent?limit=2").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["limit"], 2);
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0]["kind"], "exited");
    assert_eq!(notifications[0]["identifier"], "kissing120");
    assert_eq!(notifications[1]["identifier"], "kissing180");

    let body: serde_json::Value = server.get("/notifications/recent").await.json();
    assert_eq!(body["limit"], 50); // Default value
    assert_eq!(body["notifications"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_router_oneshot_health() {
    let app = router(create_state(Duration::seconds(10)));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
