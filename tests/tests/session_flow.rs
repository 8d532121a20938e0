//! End-to-end session lifecycle through the HTTP surface.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::Value;

async fn create_session(server: &TestServer, value: u32, participants: u32) -> String {
    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(value, participants))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["session"]["id"].as_str().unwrap().to_string()
}

async fn join(server: &TestServer, session_id: &str, name: &str) -> String {
    let response = server
        .post(&format!("/sessions/{session_id}/join"))
        .json(&fixtures::join_payload(name))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["participant"]["id"].as_str().unwrap().to_string()
}

/// The canonical scenario: threshold 2-of-3, match on R2 after two yes
/// votes, results reporting one pending voter.
#[tokio::test]
async fn test_match_on_second_yes_vote() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 3).await;
    let p1 = join(&server, &session_id, "ana").await;
    let p2 = join(&server, &session_id, "ben").await;
    let _p3 = join(&server, &session_id, "caro").await;

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&p1, "R2", "yes"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["matched"], false);
    assert_eq!(body["yes_count"], 1);
    assert_eq!(body["needed"], 2);

    let response = server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&p2, "R2", "yes"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["matched"], true);
    assert_eq!(body["winner"], "R2");
    assert_eq!(body["yes_count"], 2);
    assert_eq!(body["needed"], 2);

    // Results: R2 at yes=2, one expected voter still pending
    let response = server
        .get(&format!("/sessions/{session_id}/results"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["voters_target"], 3);
    assert_eq!(body["needed"], 2);
    assert_eq!(body["winner_ids"], serde_json::json!(["R2"]));

    let top = &body["results"][0];
    assert_eq!(top["restaurant_id"], "R2");
    assert_eq!(top["yes"], 2);
    assert_eq!(top["no"], 0);
    assert_eq!(top["pending"], 1);

    // Snapshot reflects the match
    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "matched");
    assert_eq!(body["winner"], "R2");
}

#[tokio::test]
async fn test_join_moves_session_to_voting() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 2).await;

    let response = server.get(&format!("/sessions/{session_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["status"], "open");

    join(&server, &session_id, "ana").await;

    let response = server.get(&format!("/sessions/{session_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["status"], "voting");
}

#[tokio::test]
async fn test_resume_join_is_idempotent() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 2).await;
    let p1 = join(&server, &session_id, "ana").await;

    let response = server
        .post(&format!("/sessions/{session_id}/join"))
        .json(&fixtures::resume_payload(&p1))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["participant"]["id"], p1.as_str());
    assert_eq!(body["participant"]["name"], "ana");

    // No second identity was created
    let response = server.get(&format!("/sessions/{session_id}")).await;
    let body: Value = response.json();
    assert_eq!(body["participants"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_vote_overwrite_through_api() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 2).await;
    let p1 = join(&server, &session_id, "ana").await;

    server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&p1, "R1", "yes"))
        .await
        .assert_status_ok();
    server
        .post(&format!("/sessions/{session_id}/vote"))
        .json(&fixtures::vote_payload(&p1, "R1", "no"))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/sessions/{session_id}/results"))
        .await;
    let body: Value = response.json();
    let r1 = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["restaurant_id"] == "R1")
        .unwrap();
    assert_eq!(r1["yes"], 0);
    assert_eq!(r1["no"], 1);
    assert_eq!(r1["total"], 1);
}

#[tokio::test]
async fn test_two_participant_threshold_is_floored() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // Requested value 5 with 2 participants: both must agree anyway
    let response = server
        .post("/sessions")
        .json(&fixtures::create_payload(5, 2))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["session"]["threshold"]["value"], 2);
    assert_eq!(body["session"]["threshold"]["participants"], 2);
}

#[tokio::test]
async fn test_all_done_finishes_session() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 2).await;
    let p1 = join(&server, &session_id, "ana").await;
    let p2 = join(&server, &session_id, "ben").await;

    let response = server
        .post(&format!("/sessions/{session_id}/done"))
        .json(&fixtures::done_payload(&p1))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["session_finished"], false);

    let response = server
        .post(&format!("/sessions/{session_id}/done"))
        .json(&fixtures::done_payload(&p2))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["session_finished"], true);
    assert_eq!(body["session"]["status"], "finished");
}

#[tokio::test]
async fn test_delete_session() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let session_id = create_session(&server, 2, 2).await;

    let response = server.delete(&format!("/sessions/{session_id}")).await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/sessions/{session_id}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
}
