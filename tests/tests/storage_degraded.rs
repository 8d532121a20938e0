//! Behavior when the durable backend is unreachable.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::Value;

#[tokio::test]
async fn test_fallback_serves_full_flow_while_backend_down() {
    let ctx = TestContext::new();
    ctx.backend.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    assert_eq!(ctx.backend.stored_count(), 0);
    assert_eq!(ctx.fallback.len(), 1);

    let mut pids = Vec::new();
    for name in ["ana", "ben"] {
        let response = server
            .post(&format!("/sessions/{session_id}/join"))
            .json(&fixtures::join_payload(name))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        pids.push(body["participant"]["id"].as_str().unwrap().to_string());
    }

    for pid in &pids {
        let response = server
            .post(&format!("/sessions/{session_id}/vote"))
            .json(&fixtures::vote_payload(pid, "R1", "yes"))
            .await;
        response.assert_status_ok();
    }

    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "matched");
    assert_eq!(body["winner"], "R1");
}

#[tokio::test]
async fn test_resync_moves_sessions_back_to_durable() {
    let ctx = TestContext::new();
    ctx.backend.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let session_id = body["session"]["id"].as_str().unwrap().to_string();
    assert_eq!(ctx.fallback.len(), 1);

    ctx.backend.set_should_fail(false);
    let moved = ctx.store.resync_fallback_to_durable().await;
    assert_eq!(moved, 1);
    assert_eq!(ctx.fallback.len(), 0);
    assert!(ctx.backend.stored(&session_id).is_some());

    // Reads now come from the durable backend
    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_without_fallback_errors_surface_as_503() {
    let ctx = TestContext::without_fallback();
    ctx.backend.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "STORE_503");
    assert_eq!(ctx.fallback.len(), 0);
}

#[tokio::test]
async fn test_probe_worker_resyncs_on_recovery() {
    let ctx = TestContext::new();
    ctx.backend.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(ctx.fallback.len(), 1);

    let mut probe = worker::ProbeWorker::new(ctx.store.clone());
    probe.run_once().await;
    assert!(!telemetry::health().redis.is_healthy());
    assert!(telemetry::health().is_fallback_active());
    assert_eq!(ctx.fallback.len(), 1);

    ctx.backend.set_should_fail(false);
    probe.run_once().await;
    assert!(telemetry::health().redis.is_healthy());
    assert!(!telemetry::health().is_fallback_active());
    assert_eq!(ctx.fallback.len(), 0);
    assert_eq!(ctx.backend.stored_count(), 1);
}

#[tokio::test]
async fn test_recovered_backend_serves_again() {
    let ctx = TestContext::without_fallback();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    ctx.backend.set_should_fail(true);
    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    ctx.backend.set_should_fail(false);
    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status_ok();
}
