use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{scheduling_order, validate_sentences, ExerciseStore, StoreError, UserStore, WordStore};
use crate::models::{
    Exercise, ExerciseId, LearnStatus, LearningStats, NewWord, User, UserId, Word, WordId,
};

#[derive(Debug, Clone)]
struct StoredExercise {
    id: ExerciseId,
    sentence: String,
    answered: bool,
}

#[derive(Debug, Clone)]
struct StoredWord {
    seq: u64,
    word: Word,
    exercises: Vec<StoredExercise>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashSet<UserId>,
    words: HashMap<WordId, StoredWord>,
    next_seq: u64,
}

impl Inner {
    fn insert_word(&mut self, word: Word, exercises: Vec<StoredExercise>) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.words.insert(word.id, StoredWord { seq, word, exercises });
    }
}

/// Process-local store with the same semantics as [`super::SqliteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user_id: UserId) {
        self.inner.write().users.insert(user_id);
    }

    /// Inserts a fully specified word, bypassing the pending-only rule of
    /// [`WordStore::add_word`]. Each sentence is paired with its answered flag.
    pub fn seed_word(&self, word: Word, exercises: &[(&str, bool)]) -> Vec<ExerciseId> {
        let exercises: Vec<StoredExercise> = exercises
            .iter()
            .map(|(sentence, answered)| StoredExercise {
                id: ExerciseId::new(),
                sentence: sentence.to_string(),
                answered: *answered,
            })
            .collect();
        let ids = exercises.iter().map(|e| e.id).collect();

        let mut inner = self.inner.write();
        inner.users.insert(word.user_id);
        inner.insert_word(word, exercises);
        ids
    }

    pub fn word(&self, word_id: WordId) -> Option<Word> {
        self.inner.read().words.get(&word_id).map(|w| w.word.clone())
    }

    pub fn set_status(&self, word_id: WordId, status: LearnStatus) -> bool {
        match self.inner.write().words.get_mut(&word_id) {
            Some(stored) => {
                stored.word.learn_status = status;
                true
            }
            None => false,
        }
    }

    pub fn set_last_asked(&self, word_id: WordId, at: DateTime<Utc>) -> bool {
        match self.inner.write().words.get_mut(&word_id) {
            Some(stored) => {
                stored.word.last_asked_at = Some(at);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ExerciseStore for MemoryStore {
    async fn stats_by_user(&self, user_id: UserId) -> Result<LearningStats, StoreError> {
        let inner = self.inner.read();
        let mut stats = LearningStats::default();
        for stored in inner.words.values().filter(|w| w.word.user_id == user_id) {
            match stored.word.learn_status {
                LearnStatus::Pending => stats.pending += 1,
                LearnStatus::InProgress => stats.in_progress += 1,
                LearnStatus::Learned => {}
            }
        }
        Ok(stats)
    }

    async fn oldest_exercise_by_user(
        &self,
        user_id: UserId,
        status: LearnStatus,
    ) -> Result<Option<Exercise>, StoreError> {
        let inner = self.inner.read();
        let oldest = inner
            .words
            .values()
            .filter(|w| {
                w.word.user_id == user_id && w.word.learn_status == status && !w.exercises.is_empty()
            })
            .min_by(|a, b| scheduling_order((&a.word, a.seq), (&b.word, b.seq)));

        let Some(stored) = oldest else { return Ok(None) };

        // min_by_key returns the first minimum, i.e. the earliest created exercise.
        let exercise = stored
            .exercises
            .iter()
            .min_by_key(|e| e.answered)
            .map(|e| Exercise {
                id: e.id,
                word: stored.word.clone(),
                sentence: e.sentence.clone(),
                answered: e.answered,
            });
        Ok(exercise)
    }
}

#[async_trait]
impl WordStore for MemoryStore {
    async fn add_word(&self, word: NewWord, sentences: &[String]) -> Result<Word, StoreError> {
        validate_sentences(sentences)?;

        let mut inner = self.inner.write();
        if !inner.users.contains(&word.user_id) {
            return Err(StoreError::UnknownUser(word.user_id));
        }

        let stored = Word {
            id: WordId::new(),
            user_id: word.user_id,
            spelling: word.spelling,
            definition: word.definition,
            lexical_category: word.lexical_category,
            language: word.language,
            learn_status: LearnStatus::Pending,
            answered_count: 0,
            added_at: Utc::now(),
            last_asked_at: None,
        };
        let exercises = sentences
            .iter()
            .map(|sentence| StoredExercise {
                id: ExerciseId::new(),
                sentence: sentence.clone(),
                answered: false,
            })
            .collect();

        inner.insert_word(stored.clone(), exercises);
        Ok(stored)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self) -> Result<User, StoreError> {
        let user = User { id: UserId::new() };
        self.inner.write().users.insert(user.id);
        Ok(user)
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.inner.read().users.contains(&user_id))
    }
}
