use std::sync::Arc;

use exam_sentry::models::verification::IdentityVerificationLog;
use exam_sentry::persistence::{db, verification_repo::VerificationRepo};

async fn repo() -> VerificationRepo {
    let pool = db::connect_memory().await.expect("in-memory connect");
    VerificationRepo::new(Arc::new(pool))
}

#[tokio::test]
async fn latest_for_empty_log_is_none() {
    let repo = repo().await;
    let latest = repo.latest_for("u1", "e1").await.expect("query");
    assert!(latest.is_none());
}

#[tokio::test]
async fn latest_for_returns_most_recent_entry() {
    let repo = repo().await;

    let mut first = IdentityVerificationLog::record("u1".into(), "e1".into(), 0.8, 0.6);
    first.timestamp -= chrono::Duration::seconds(30);
    repo.create(&first).await.expect("older entry");

    let second = IdentityVerificationLog::record("u1".into(), "e1".into(), 0.4, 0.6);
    repo.create(&second).await.expect("newer entry");

    let latest = repo
        .latest_for("u1", "e1")
        .await
        .expect("query")
        .expect("entry exists");
    assert_eq!(latest.id, second.id);
    assert!(!latest.success);
}

#[tokio::test]
async fn equal_timestamps_resolve_to_last_insert() {
    let repo = repo().await;

    let first = IdentityVerificationLog::record("u1".into(), "e1".into(), 0.9, 0.6);
    let mut second = IdentityVerificationLog::record("u1".into(), "e1".into(), 0.1, 0.6);
    second.timestamp = first.timestamp;

    repo.create(&first).await.expect("first insert");
    repo.create(&second).await.expect("second insert");

    let latest = repo
        .latest_for("u1", "e1")
        .await
        .expect("query")
        .expect("entry exists");
    assert_eq!(latest.id, second.id, "last write wins on timestamp ties");
}

#[tokio::test]
async fn lookups_are_scoped_to_the_exam() {
    let repo = repo().await;
    let log = IdentityVerificationLog::record("u1".into(), "e1".into(), 0.9, 0.6);
    repo.create(&log).await.expect("insert");

    assert!(repo.latest_for("u1", "e2").await.expect("query").is_none());
    assert!(repo.latest_for("u2", "e1").await.expect("query").is_none());
}
