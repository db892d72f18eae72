pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod sentences;
pub mod services;
pub mod store;

pub use models::{Exercise, LearnStatus, LearningStats, UserId, Word};
pub use scheduler::{admit, ExerciseScheduler, SchedulerError, MAX_CONCURRENT_LEARNING};
pub use store::{ExerciseStore, MemoryStore, SqliteStore, StoreError};
