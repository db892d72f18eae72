//! Property tests for exercise admission.
//!
//! Each case seeds an in-memory store with the generated bucket sizes and
//! checks which bucket the served exercise comes from.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use vocabforge::models::{Language, LearnStatus, LearningStats, UserId, Word, WordId};
use vocabforge::{admit, ExerciseScheduler, MemoryStore, SchedulerError, MAX_CONCURRENT_LEARNING};

fn seed(store: &MemoryStore, user_id: UserId, status: LearnStatus, count: u64) {
    for i in 0..count as i64 {
        store.seed_word(
            Word {
                id: WordId::new(),
                user_id,
                spelling: format!("{status}-{i}"),
                definition: "definition".to_string(),
                lexical_category: String::new(),
                language: Language::default(),
                learn_status: status,
                answered_count: 0,
                added_at: Utc.timestamp_opt(i, 0).unwrap(),
                last_asked_at: None,
            },
            &[("sentence", false)],
        );
    }
}

fn serve(pending: u64, in_progress: u64, learned: u64) -> Result<LearnStatus, SchedulerError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let store = MemoryStore::new();
        let user_id = UserId::new();
        seed(&store, user_id, LearnStatus::Pending, pending);
        seed(&store, user_id, LearnStatus::InProgress, in_progress);
        seed(&store, user_id, LearnStatus::Learned, learned);
        ExerciseScheduler::new(store)
            .next_exercise(user_id)
            .await
            .map(|e| e.status())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_served_bucket_matches_policy(
        pending in 0u64..8,
        in_progress in 0u64..80,
        learned in 0u64..4,
    ) {
        let served = serve(pending, in_progress, learned);
        if pending == 0 && in_progress == 0 {
            prop_assert!(matches!(served, Err(SchedulerError::NoWordsToLearn)));
        } else if in_progress < MAX_CONCURRENT_LEARNING && pending > 0 {
            prop_assert_eq!(served.unwrap(), LearnStatus::Pending);
        } else {
            prop_assert_eq!(served.unwrap(), LearnStatus::InProgress);
        }
    }

    #[test]
    fn prop_never_starts_new_word_at_cap(
        pending in 0u64..1_000,
        in_progress in MAX_CONCURRENT_LEARNING..10_000,
    ) {
        let stats = LearningStats { pending, in_progress };
        prop_assert_eq!(admit(stats), Some(LearnStatus::InProgress));
    }

    #[test]
    fn prop_admit_only_empty_when_no_words(pending in 0u64..200, in_progress in 0u64..200) {
        let stats = LearningStats { pending, in_progress };
        prop_assert_eq!(admit(stats).is_none(), pending == 0 && in_progress == 0);
    }
}
