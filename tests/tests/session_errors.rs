//! Error responses: unknown sessions and participants, invalid input.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::Value;

async fn started_session(server: &TestServer) -> (String, String) {
    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let session_id = body["session"]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/sessions/{session_id}/join"))
        .json(&fixtures::join_payload("ana"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let participant_id = body["participant"]["id"].as_str().unwrap().to_string();

    (session_id, participant_id)
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/sessions/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "SESSION_404");

    let response = server
        .post("/sessions/nope/join")
        .json(&fixtures::join_payload("ana"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .post("/sessions/nope/vote")
        .json(&fixtures::vote_payload("p", "R1", "yes"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server.get("/sessions/nope/results").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_participant_is_403() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let (session_id, _) = started_session(&server).await;

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload("ghost", "R1", "yes"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "PART_403");

    let response = server
        .post(&format!("/sessions/{session_id}/done"))
        .json(&fixtures::done_payload("ghost"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Resuming an id the session has never seen is the same offense
    let response = server
        .post(&format!("/sessions/{session_id}/join"))
        .json(&fixtures::resume_payload("ghost"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_vote_input_is_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let (session_id, participant_id) = started_session(&server).await;

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&participant_id, "R1", "maybe"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_400");

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&participant_id, "R99", "yes"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_rejects_bad_threshold() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 1))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_400");
}

#[tokio::test]
async fn test_create_rejects_empty_deck() {
    let ctx = TestContext::with_deck(vec![]);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(2, 2))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vote_rejected_after_finish() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let (session_id, p1) = started_session(&server).await;
    let response = server
        .post(&format!("/sessions/{session_id}/join"))
        .json(&fixtures::join_payload("ben"))
        .await;
    let p2 = response.json::<Value>()["participant"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    for pid in [&p1, &p2] {
        server
            .post(&format!("/sessions/{session_id}/done"))
            .json(&fixtures::done_payload(pid))
            .await
            .assert_status_ok();
    }

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&p1, "R1", "yes"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
