use std::sync::Arc;

use exam_sentry::models::question::QuestionKey;
use exam_sentry::persistence::{db, question_repo::QuestionRepo};

#[tokio::test]
async fn question_set_returns_seeded_keys_in_order() {
    let pool = db::connect_memory().await.expect("in-memory connect");
    let repo = QuestionRepo::new(Arc::new(pool));

    for (id, correct) in [("q1", "a"), ("q2", "c"), ("q3", "b")] {
        repo.create(
            "exam-1",
            &QuestionKey {
                id: id.into(),
                correct_option: correct.into(),
            },
        )
        .await
        .expect("seed question");
    }

    let set = repo.question_set("exam-1").await.expect("question set");
    assert_eq!(set.len(), 3);
    assert_eq!(set[0].id, "q1");
    assert_eq!(set[2].correct_option, "b");

    let empty = repo.question_set("exam-2").await.expect("other exam");
    assert!(empty.is_empty());
}
