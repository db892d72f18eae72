#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;

use vocabforge::models::{Language, LearnStatus, NewWord, UserId, Word};
use vocabforge::store::{SqliteStore, UserStore, WordStore};

pub struct TestDb {
    pub store: SqliteStore,
    _dir: TempDir,
}

pub async fn open_store() -> TestDb {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = SqliteStore::open(&dir.path().join("vocabforge.db"), Duration::from_secs(5))
        .await
        .expect("failed to open store");
    TestDb { store, _dir: dir }
}

pub async fn create_user(store: &SqliteStore) -> UserId {
    store.create_user().await.expect("create user").id
}

/// Adds a word and rewrites its status and timestamps (unix seconds).
pub async fn add_word(
    store: &SqliteStore,
    user_id: UserId,
    spelling: &str,
    status: LearnStatus,
    added_at: i64,
    last_asked_at: Option<i64>,
    sentences: &[&str],
) -> Word {
    let word = store
        .add_word(
            NewWord {
                user_id,
                spelling: spelling.to_string(),
                definition: format!("definition of {spelling}"),
                lexical_category: "noun".to_string(),
                language: Language::default(),
            },
            &sentences.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
        .await
        .expect("add word");

    sqlx::query(
        r#"UPDATE "words" SET "learnStatus" = ?, "addedAt" = ?, "lastAskedAt" = ? WHERE "id" = ?"#,
    )
    .bind(status.as_str())
    .bind(added_at * 1000)
    .bind(last_asked_at.map(|s| s * 1000))
    .bind(word.id.to_string())
    .execute(store.pool())
    .await
    .expect("update word");

    word
}

pub async fn add_many(
    store: &SqliteStore,
    user_id: UserId,
    status: LearnStatus,
    count: usize,
    base: i64,
) {
    for i in 0..count as i64 {
        let spelling = format!("{status}-{i}");
        let asked = (status != LearnStatus::Pending).then_some(base + i);
        add_word(store, user_id, &spelling, status, base + i, asked, &["filler"]).await;
    }
}
