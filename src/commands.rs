use std::future::Future;
use std::io::Write;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::cli::{AddWordArgs, Command, UserArgs};
use crate::config::Config;
use crate::models::UserId;
use crate::scheduler::{ExerciseScheduler, SchedulerError};
use crate::sentences::{GenerationError, LlmSentenceGenerator, PromptTemplate};
use crate::services::{AddWordInput, UserService, VocabularyError, VocabularyService};
use crate::store::{ExerciseStore, SqliteStore, StoreError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unable to open database")]
    Open(#[source] StoreError),
    #[error("unable to create user")]
    CreateUser(#[source] StoreError),
    #[error("unable to read stats")]
    Stats(#[source] StoreError),
    #[error("unable to create sentence generator")]
    Generator(#[from] GenerationError),
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("unable to write output")]
    Output(#[from] std::io::Error),
}

pub async fn run(command: Command, config: &Config) -> Result<(), CommandError> {
    let store = SqliteStore::open(&config.database_path, config.connect_timeout)
        .await
        .map_err(CommandError::Open)?;
    run_with_store(command, config, store, &mut std::io::stdout()).await
}

/// Runs `command` against an already opened store, writing user-facing output
/// to `out`.
pub async fn run_with_store(
    command: Command,
    config: &Config,
    store: SqliteStore,
    out: &mut (dyn Write + Send),
) -> Result<(), CommandError> {
    match command {
        Command::CreateUser => {
            let users = UserService::new(store);
            let user = with_timeout(config.command_timeout, users.create())
                .await?
                .map_err(CommandError::CreateUser)?;
            info!(user_id = %user.id, "user created");
            writeln!(out, "{}", user.id)?;
        }
        Command::AddWord(args) => add_word(args, config, store, out).await?,
        Command::NextExercise(UserArgs { user_id }) => {
            next_exercise(user_id, config, store, out).await?
        }
        Command::Stats(UserArgs { user_id }) => {
            let stats = with_timeout(config.command_timeout, store.stats_by_user(user_id))
                .await?
                .map_err(CommandError::Stats)?;
            writeln!(out, "pending: {}", stats.pending)?;
            writeln!(out, "in progress: {}", stats.in_progress)?;
        }
    }
    Ok(())
}

async fn add_word(
    args: AddWordArgs,
    config: &Config,
    store: SqliteStore,
    out: &mut (dyn Write + Send),
) -> Result<(), CommandError> {
    let generator = LlmSentenceGenerator::new(config.llm.clone(), PromptTemplate::default())?;
    if args.sentences.is_empty() && !generator.is_available() {
        warn!("no sentences given and VOCABFORGE_LLM_API_KEY is unset, generation will fail");
    }
    let vocabulary = VocabularyService::new(store, generator, config.sentences_count);

    let input = AddWordInput {
        user_id: args.user_id,
        spelling: args.spelling,
        definition: args.definition,
        lexical_category: args.lexical_category,
        language: args.language.unwrap_or_else(|| config.language.clone()),
        sentences: args.sentences,
    };
    let word = with_timeout(config.command_timeout, vocabulary.add_word(input)).await??;

    info!(word_id = %word.id, spelling = %word.spelling, "word added");
    writeln!(out, "{}", word.id)?;
    Ok(())
}

async fn next_exercise(
    user_id: UserId,
    config: &Config,
    store: SqliteStore,
    out: &mut (dyn Write + Send),
) -> Result<(), CommandError> {
    let scheduler = ExerciseScheduler::new(store);
    let deadline = Instant::now() + config.command_timeout;

    match scheduler.next_exercise_before(user_id, deadline).await {
        Ok(exercise) => {
            info!(
                exercise_id = %exercise.id,
                word_id = %exercise.word.id,
                status = %exercise.status(),
                "exercise selected"
            );
            writeln!(out, "{}", exercise.sentence)?;
            Ok(())
        }
        Err(SchedulerError::NoWordsToLearn) => {
            info!(%user_id, "no words to learn");
            writeln!(out, "No words to learn yet. Add one with `vocabforge add-word`.")?;
            Ok(())
        }
        Err(err) => {
            if err.is_retryable() {
                warn!(%user_id, error = %err, "exercise selection may succeed on retry");
            }
            Err(err.into())
        }
    }
}

async fn with_timeout<F: Future>(limit: Duration, fut: F) -> Result<F::Output, CommandError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| CommandError::Timeout(limit))
}
