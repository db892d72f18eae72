use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ExerciseId, Language, UserId, WordId};
use super::status::LearnStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    pub user_id: UserId,
    pub spelling: String,
    pub definition: String,
    pub lexical_category: String,
    pub language: Language,
    pub learn_status: LearnStatus,
    pub answered_count: u32,
    pub added_at: DateTime<Utc>,
    /// `None` until the word has been asked at least once.
    pub last_asked_at: Option<DateTime<Utc>>,
}

/// A practice sentence together with the word it drills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,
    pub word: Word,
    pub sentence: String,
    pub answered: bool,
}

impl Exercise {
    pub fn status(&self) -> LearnStatus {
        self.word.learn_status
    }
}

/// Input for adding a word; the store assigns id, status and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub user_id: UserId,
    pub spelling: String,
    pub definition: String,
    pub lexical_category: String,
    pub language: Language,
}

/// Per-user word counts that drive admission. Learned words are deliberately
/// absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub pending: u64,
    pub in_progress: u64,
}

impl LearningStats {
    pub fn is_empty(&self) -> bool {
        self.pending == 0 && self.in_progress == 0
    }
}
