mod common;

use std::time::Duration;

use common::{add_many, add_word, create_user, open_store};
use tokio::time::Instant;
use vocabforge::models::LearnStatus;
use vocabforge::{ExerciseScheduler, SchedulerError, MAX_CONCURRENT_LEARNING};

#[tokio::test]
async fn test_user_without_words_has_nothing_to_learn() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    add_many(&db.store, user_id, LearnStatus::Learned, 3, 0).await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    let err = scheduler.next_exercise(user_id).await.unwrap_err();
    assert!(matches!(err, SchedulerError::NoWordsToLearn));
}

#[tokio::test]
async fn test_headroom_starts_oldest_added_pending_word() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    add_many(&db.store, user_id, LearnStatus::InProgress, 10, 0).await;
    add_word(&db.store, user_id, "newer", LearnStatus::Pending, 5_000, None, &["newer"]).await;
    let oldest = add_word(&db.store, user_id, "oldest", LearnStatus::Pending, 3_000, None, &["oldest"]).await;
    add_word(&db.store, user_id, "middle", LearnStatus::Pending, 4_000, None, &["middle"]).await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    let exercise = scheduler.next_exercise(user_id).await.unwrap();
    assert_eq!(exercise.status(), LearnStatus::Pending);
    assert_eq!(exercise.word.id, oldest.id);
}

#[tokio::test]
async fn test_at_cap_drills_oldest_asked_in_progress_word() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    add_many(&db.store, user_id, LearnStatus::Pending, 5, 0).await;
    add_many(
        &db.store,
        user_id,
        LearnStatus::InProgress,
        MAX_CONCURRENT_LEARNING as usize - 1,
        1_000,
    )
    .await;
    let stalest = add_word(
        &db.store,
        user_id,
        "stalest",
        LearnStatus::InProgress,
        9_000,
        Some(10),
        &["stalest"],
    )
    .await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    let exercise = scheduler.next_exercise(user_id).await.unwrap();
    assert_eq!(exercise.status(), LearnStatus::InProgress);
    assert_eq!(exercise.word.id, stalest.id);
}

#[tokio::test]
async fn test_without_pending_words_drills_in_progress() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    add_word(&db.store, user_id, "recent", LearnStatus::InProgress, 0, Some(200), &["recent"]).await;
    let stale = add_word(&db.store, user_id, "stale", LearnStatus::InProgress, 100, Some(50), &["stale"]).await;
    add_many(&db.store, user_id, LearnStatus::Learned, 2, 0).await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    let exercise = scheduler.next_exercise(user_id).await.unwrap();
    assert_eq!(exercise.word.id, stale.id);
}

#[tokio::test]
async fn test_selection_is_stable_without_writes() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    add_many(&db.store, user_id, LearnStatus::Pending, 3, 0).await;
    add_many(&db.store, user_id, LearnStatus::InProgress, 3, 100).await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    let deadline = Instant::now() + Duration::from_secs(5);
    let first = scheduler.next_exercise_before(user_id, deadline).await.unwrap();
    let second = scheduler.next_exercise_before(user_id, deadline).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_asking_a_word_rotates_to_the_next_one() {
    let db = open_store().await;
    let user_id = create_user(&db.store).await;
    let a = add_word(&db.store, user_id, "a", LearnStatus::InProgress, 0, Some(10), &["a"]).await;
    let b = add_word(&db.store, user_id, "b", LearnStatus::InProgress, 1, Some(20), &["b"]).await;

    let scheduler = ExerciseScheduler::new(db.store.clone());
    assert_eq!(scheduler.next_exercise(user_id).await.unwrap().word.id, a.id);

    sqlx::query(r#"UPDATE "words" SET "lastAskedAt" = ? WHERE "id" = ?"#)
        .bind(30_000i64)
        .bind(a.id.to_string())
        .execute(db.store.pool())
        .await
        .unwrap();
    assert_eq!(scheduler.next_exercise(user_id).await.unwrap().word.id, b.id);
}
