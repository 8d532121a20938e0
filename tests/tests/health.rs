//! Health and probe endpoints.
//!
//! The registry is process-global, so all state transitions happen in
//! a single test to keep assertions ordered.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::Value;
use telemetry::{health, metrics};

#[tokio::test]
async fn test_liveness_is_unconditional() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health/live").await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_request_latency_recorded_on_every_route() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // The histogram is global and monotonic, so count deltas are safe
    // even with other tests running.
    let before = metrics().request_latency_ms.count();

    server.get("/health").await.assert_status(StatusCode::OK);
    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let session_id = body["session"]["id"].as_str().unwrap();
    server
        .get(&format!("/sessions/{session_id}/results"))
        .await
        .assert_status(StatusCode::OK);

    assert!(metrics().request_latency_ms.count() >= before + 3);
}

#[tokio::test]
async fn test_health_tracks_redis_and_fallback_state() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // Redis never probed healthy, fallback not yet engaged
    health().redis.set_unhealthy("connection refused");
    health().set_fallback_active(false);

    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["redis_connected"], false);

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    // Fallback engaged: still serving, reported as degraded
    health().set_fallback_active(true);

    let response = server.get("/health").await;
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["fallback_active"], true);

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);

    // Redis back: healthy, fallback flag cleared by the probe worker
    health().redis.set_healthy();
    health().set_fallback_active(false);

    let response = server.get("/health").await;
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["redis_connected"], true);
    assert_eq!(body["fallback_active"], false);

    let response = server.get("/health/ready").await;
    response.assert_status(StatusCode::OK);
}
