//! Persistence collaborators.
//!
//! The scheduler only sees [`ExerciseStore`]; adding words and users goes
//! through [`WordStore`] and [`UserStore`]. Both backends implement all three.

mod memory;
mod schema;
mod sqlite;

use std::cmp::Ordering;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Exercise, LearnStatus, LearningStats, NewWord, User, UserId, Word};

pub use memory::MemoryStore;
pub use schema::split_sql_statements;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Read side consumed by the scheduler.
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Counts of the user's pending and in-progress words.
    async fn stats_by_user(&self, user_id: UserId) -> Result<LearningStats, StoreError>;

    /// One exercise of the user's least recently asked word in `status`, or
    /// `None` when the user has no such word.
    ///
    /// Words are ordered by [`scheduling_order`]. Within the chosen word an
    /// unanswered exercise is preferred, then the earliest created one.
    async fn oldest_exercise_by_user(
        &self,
        user_id: UserId,
        status: LearnStatus,
    ) -> Result<Option<Exercise>, StoreError>;
}

#[async_trait]
pub trait WordStore: Send + Sync {
    /// Persists a pending word owning one exercise per sentence.
    async fn add_word(&self, word: NewWord, sentences: &[String]) -> Result<Word, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self) -> Result<User, StoreError>;

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError>;
}

/// Oldest-first ordering of words within a status bucket: never asked words
/// first, then `last_asked_at`, then `added_at`.
///
/// Remaining ties go to the word inserted first; `seq` is the word's
/// insertion sequence within its backend.
pub fn scheduling_order(a: (&Word, u64), b: (&Word, u64)) -> Ordering {
    let ((a, a_seq), (b, b_seq)) = (a, b);
    let asked = |w: &Word| w.last_asked_at.is_some();
    asked(a)
        .cmp(&asked(b))
        .then_with(|| a.last_asked_at.cmp(&b.last_asked_at))
        .then_with(|| a.added_at.cmp(&b.added_at))
        .then_with(|| a_seq.cmp(&b_seq))
}

fn validate_sentences(sentences: &[String]) -> Result<(), StoreError> {
    if sentences.is_empty() {
        return Err(StoreError::Validation(
            "a word needs at least one exercise sentence".to_string(),
        ));
    }
    if sentences.iter().any(|s| s.trim().is_empty()) {
        return Err(StoreError::Validation(
            "exercise sentences must not be blank".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, WordId};
    use chrono::{TimeZone, Utc};

    fn word(added_secs: i64, asked_secs: Option<i64>) -> Word {
        Word {
            id: WordId::new(),
            user_id: UserId::new(),
            spelling: "w".into(),
            definition: "d".into(),
            lexical_category: String::new(),
            language: Language::default(),
            learn_status: LearnStatus::InProgress,
            answered_count: 0,
            added_at: Utc.timestamp_opt(added_secs, 0).unwrap(),
            last_asked_at: asked_secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    #[test]
    fn test_never_asked_sorts_first() {
        let asked_early = word(0, Some(1));
        let never = word(100, None);
        assert_eq!(scheduling_order((&never, 2), (&asked_early, 1)), Ordering::Less);
    }

    #[test]
    fn test_last_asked_then_added() {
        let a = word(50, Some(10));
        let b = word(10, Some(20));
        assert_eq!(scheduling_order((&a, 2), (&b, 1)), Ordering::Less);

        let c = word(10, Some(10));
        assert_eq!(scheduling_order((&c, 3), (&a, 2)), Ordering::Less);
    }

    #[test]
    fn test_insertion_order_breaks_timestamp_ties() {
        let first = word(10, None);
        let mut second = word(10, None);
        second.added_at = first.added_at;
        assert_eq!(scheduling_order((&first, 1), (&second, 2)), Ordering::Less);
        assert_eq!(scheduling_order((&second, 2), (&first, 1)), Ordering::Greater);
    }

    #[test]
    fn test_sentence_validation() {
        assert!(validate_sentences(&[]).is_err());
        assert!(validate_sentences(&["  ".to_string()]).is_err());
        assert!(validate_sentences(&["I <%run%> daily.".to_string()]).is_ok());
    }
}
