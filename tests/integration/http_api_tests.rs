//! End-to-end tests against the HTTP surface on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use exam_sentry::http::{self, AppState};

use super::test_helpers::{seed_questions, test_config, test_state_with};

/// Spawn the API server on an ephemeral port, returning the base URL.
///
/// Caller must cancel `ct` to shut the server down.
async fn spawn_server() -> (String, CancellationToken, Arc<AppState>) {
    // Bind a temporary listener to discover a free port, then hand the
    // port to the server config.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let mut config = test_config();
    config.http_port = port;
    let state = test_state_with(config).await;

    let ct = CancellationToken::new();
    let server_ct = ct.clone();
    let server_state = Arc::clone(&state);
    tokio::spawn(async move {
        let _ = http::serve(server_state, server_ct).await;
    });

    let base = format!("http://127.0.0.1:{port}");
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(resp) = client.get(format!("{base}/health")).send().await {
            if resp.status().is_success() {
                return (base, ct, state);
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not become healthy in time");
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (base, ct, _state) = spawn_server().await;

    let body = reqwest::get(format!("{base}/health"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "ok");

    ct.cancel();
}

#[tokio::test]
async fn start_without_verification_is_forbidden() {
    let (base, ct, _state) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/sessions/start"))
        .json(&json!({ "candidate_id": "cand-1", "exam_id": "exam-1" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

    let body: Value = resp.json().await.expect("error body");
    assert!(body["error"].as_str().expect("message").contains("precondition"));

    ct.cancel();
}

#[tokio::test]
async fn full_proctoring_flow_over_http() {
    let (base, ct, _state) = spawn_server().await;
    let client = reqwest::Client::new();

    // Verification caller records a passing identity check.
    let resp = client
        .post(format!("{base}/verifications"))
        .json(&json!({ "user_id": "cand-1", "exam_id": "exam-1", "similarity_score": 0.82 }))
        .send()
        .await
        .expect("record verification");
    assert!(resp.status().is_success());
    let verification: Value = resp.json().await.expect("verification body");
    assert_eq!(verification["success"], Value::Bool(true));

    // Start the session.
    let resp = client
        .post(format!("{base}/sessions/start"))
        .json(&json!({ "candidate_id": "cand-1", "exam_id": "exam-1" }))
        .send()
        .await
        .expect("start");
    assert!(resp.status().is_success());
    let session: Value = resp.json().await.expect("session body");
    let session_id = session["id"].as_str().expect("session id").to_owned();
    assert_eq!(session["status"], "active");

    // Validate before interacting.
    let resp = client
        .get(format!(
            "{base}/sessions/{session_id}/validate?candidate_id=cand-1"
        ))
        .send()
        .await
        .expect("validate");
    assert!(resp.status().is_success());

    // Detection pipeline reports two warnings, then a phone.
    for _ in 0..2 {
        let resp = client
            .post(format!("{base}/sessions/{session_id}/violation"))
            .json(&json!({ "kind": "no_face", "severity": "low", "confidence": 0.9 }))
            .send()
            .await
            .expect("report");
        assert!(resp.status().is_success());
    }
    let resp = client
        .post(format!("{base}/sessions/{session_id}/violation"))
        .json(&json!({
            "kind": "mobile_phone_detected",
            "severity": "high",
            "confidence": 0.95,
            "evidence_ref": "evidence/frame.jpg"
        }))
        .send()
        .await
        .expect("report high");
    let outcome: Value = resp.json().await.expect("outcome body");
    assert_eq!(outcome["status"], "terminated");
    assert_eq!(outcome["warning_count"], 2);
    assert_eq!(outcome["termination_reason"], "mobile_phone_detected");

    // Post-termination reports are accepted no-ops.
    let resp = client
        .post(format!("{base}/sessions/{session_id}/violation"))
        .json(&json!({ "kind": "no_face", "severity": "low", "confidence": 0.9 }))
        .send()
        .await
        .expect("late report");
    assert!(resp.status().is_success());
    let outcome: Value = resp.json().await.expect("late outcome");
    assert_eq!(outcome["warning_count"], 2);
    assert!(outcome["termination_reason"].is_null());

    // Audit listing shows the three accepted violations.
    let violations: Value = client
        .get(format!("{base}/sessions/{session_id}/violations"))
        .send()
        .await
        .expect("list violations")
        .json()
        .await
        .expect("violations body");
    assert_eq!(violations.as_array().expect("array").len(), 3);

    // Dashboard listings reflect the terminal state.
    let active: Value = client
        .get(format!("{base}/sessions/active"))
        .send()
        .await
        .expect("list active")
        .json()
        .await
        .expect("active body");
    assert!(active.as_array().expect("array").is_empty());

    ct.cancel();
}

#[tokio::test]
async fn submit_flow_and_conflict_over_http() {
    let (base, ct, state) = spawn_server().await;
    let client = reqwest::Client::new();
    seed_questions(&state, "exam-1", &[("q1", "a"), ("q2", "b")]).await;

    client
        .post(format!("{base}/verifications"))
        .json(&json!({ "user_id": "cand-1", "exam_id": "exam-1", "similarity_score": 0.9 }))
        .send()
        .await
        .expect("verification");
    let session: Value = client
        .post(format!("{base}/sessions/start"))
        .json(&json!({ "candidate_id": "cand-1", "exam_id": "exam-1" }))
        .send()
        .await
        .expect("start")
        .json()
        .await
        .expect("session body");
    let session_id = session["id"].as_str().expect("session id").to_owned();

    let resp = client
        .post(format!("{base}/sessions/{session_id}/submit"))
        .json(&json!({ "answers": { "q1": "a", "q2": "c" } }))
        .send()
        .await
        .expect("submit");
    assert!(resp.status().is_success());
    let completed: Value = resp.json().await.expect("completed body");
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["score"], 1);
    assert_eq!(completed["total_questions"], 2);

    // A client retry must surface as a conflict, not a silent re-score.
    let resp = client
        .post(format!("{base}/sessions/{session_id}/submit"))
        .json(&json!({ "answers": { "q1": "a", "q2": "b" } }))
        .send()
        .await
        .expect("retry submit");
    assert_eq!(resp.status(), reqwest::StatusCode::CONFLICT);

    ct.cancel();
}

#[tokio::test]
async fn unknown_session_maps_to_not_found() {
    let (base, ct, _state) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/sessions/missing/violation"))
        .json(&json!({ "kind": "no_face", "severity": "low", "confidence": 0.9 }))
        .send()
        .await
        .expect("report");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base}/sessions/missing/terminate"))
        .send()
        .await
        .expect("terminate");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    ct.cancel();
}
