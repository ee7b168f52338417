use std::sync::Arc;

use exam_sentry::models::violation::{Severity, Violation};
use exam_sentry::persistence::{db, violation_repo::ViolationRepo};

async fn repo() -> ViolationRepo {
    let pool = db::connect_memory().await.expect("in-memory connect");
    ViolationRepo::new(Arc::new(pool))
}

fn report(session_id: &str, kind: &str, severity: Severity) -> Violation {
    Violation::new(session_id.into(), kind.into(), severity, 0.9, None)
}

#[tokio::test]
async fn create_and_list_round_trips() {
    let repo = repo().await;
    let violation = Violation::new(
        "sess-1".into(),
        "mobile_phone_detected".into(),
        Severity::High,
        0.95,
        Some("evidence/sess-1/frame.jpg".into()),
    );
    repo.create(&violation).await.expect("create violation");

    let listed = repo.list_for_session("sess-1").await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], violation);
}

#[tokio::test]
async fn listing_preserves_ingestion_order_and_scopes_by_session() {
    let repo = repo().await;
    repo.create(&report("sess-1", "no_face", Severity::Low))
        .await
        .expect("first");
    repo.create(&report("sess-1", "no_face", Severity::Medium))
        .await
        .expect("second");
    repo.create(&report("sess-2", "no_face", Severity::Low))
        .await
        .expect("other session");

    let listed = repo.list_for_session("sess-1").await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].severity, Severity::Low);
    assert_eq!(listed[1].severity, Severity::Medium);

    assert_eq!(repo.count_for_session("sess-1").await.expect("count"), 2);
    assert_eq!(repo.count_for_session("sess-2").await.expect("count"), 1);
    assert_eq!(repo.count_for_session("sess-3").await.expect("count"), 0);
}
