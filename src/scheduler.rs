//! Exercise selection.
//!
//! [`ExerciseScheduler::next_exercise`] reads the user's word counts, decides
//! whether a new word may be started, and returns an exercise of the oldest
//! word in the chosen status bucket. It never writes and never logs; status
//! transitions and `last_asked_at` updates belong to whoever records answers.

use std::fmt;

use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use crate::models::{Exercise, LearnStatus, LearningStats, UserId};
use crate::store::{ExerciseStore, StoreError};

/// Hard cap on words a user may have in progress before new ones are withheld.
pub const MAX_CONCURRENT_LEARNING: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Stats,
    Exercise(LearnStatus),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Stats => f.write_str("stats query"),
            Step::Exercise(status) => write!(f, "{status} exercise query"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no words to learn")]
    NoWordsToLearn,
    /// Stats reported words in `status` but the exercise query found none.
    #[error("stats reported {status} words but none were found")]
    Inconsistent { status: LearnStatus },
    #[error("unable to get user's vocabulary stats")]
    Stats(#[source] StoreError),
    #[error("unable to get {status} exercise")]
    Exercise {
        status: LearnStatus,
        #[source]
        source: StoreError,
    },
    #[error("deadline expired during {step}")]
    Timeout { step: Step },
}

impl SchedulerError {
    /// Whether calling `next_exercise` again may succeed without any other
    /// change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Inconsistent { .. } | Self::Timeout { .. })
    }
}

/// Admission policy: which status bucket to serve from, or `None` when the
/// user has nothing left to learn.
pub fn admit(stats: LearningStats) -> Option<LearnStatus> {
    if stats.is_empty() {
        None
    } else if stats.in_progress < MAX_CONCURRENT_LEARNING && stats.pending > 0 {
        Some(LearnStatus::Pending)
    } else {
        Some(LearnStatus::InProgress)
    }
}

pub struct ExerciseScheduler<S> {
    store: S,
}

impl<S: ExerciseStore> ExerciseScheduler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn next_exercise(&self, user_id: UserId) -> Result<Exercise, SchedulerError> {
        let stats = self
            .store
            .stats_by_user(user_id)
            .await
            .map_err(SchedulerError::Stats)?;
        let status = admit(stats).ok_or(SchedulerError::NoWordsToLearn)?;
        self.exercise_in(user_id, status).await
    }

    /// Like [`Self::next_exercise`], but each store call is bounded by
    /// `deadline`.
    pub async fn next_exercise_before(
        &self,
        user_id: UserId,
        deadline: Instant,
    ) -> Result<Exercise, SchedulerError> {
        let stats = timeout_at(deadline, self.store.stats_by_user(user_id))
            .await
            .map_err(|_| SchedulerError::Timeout { step: Step::Stats })?
            .map_err(SchedulerError::Stats)?;
        let status = admit(stats).ok_or(SchedulerError::NoWordsToLearn)?;

        timeout_at(deadline, self.exercise_in(user_id, status))
            .await
            .map_err(|_| SchedulerError::Timeout {
                step: Step::Exercise(status),
            })?
    }

    async fn exercise_in(
        &self,
        user_id: UserId,
        status: LearnStatus,
    ) -> Result<Exercise, SchedulerError> {
        self.store
            .oldest_exercise_by_user(user_id, status)
            .await
            .map_err(|source| SchedulerError::Exercise { status, source })?
            .ok_or(SchedulerError::Inconsistent { status })
    }
}
