use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::schema::apply_schema;
use super::{validate_sentences, ExerciseStore, StoreError, UserStore, WordStore};
use crate::models::{
    Exercise, ExerciseId, Language, LearnStatus, LearningStats, NewWord, User, UserId, Word, WordId,
};

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `path` and applies the schema.
    pub async fn open(path: &Path, connect_timeout: Duration) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(connect_timeout)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        apply_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ExerciseStore for SqliteStore {
    async fn stats_by_user(&self, user_id: UserId) -> Result<LearningStats, StoreError> {
        let rows = sqlx::query(
            r#"SELECT "learnStatus", COUNT(*) AS "count"
               FROM "words" WHERE "userId" = ?
               GROUP BY "learnStatus""#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut stats = LearningStats::default();
        for row in &rows {
            let status = parse_status(row)?;
            let count: i64 = row.try_get("count")?;
            let count = u64::try_from(count)
                .map_err(|_| StoreError::Corrupt(format!("negative word count {count}")))?;
            match status {
                LearnStatus::Pending => stats.pending = count,
                LearnStatus::InProgress => stats.in_progress = count,
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
        let row = sqlx::query(
            r#"SELECT w."id", w."userId", w."spelling", w."definition", w."lexicalCategory",
                      w."language", w."learnStatus", w."answeredCount", w."addedAt", w."lastAskedAt",
                      e."id" AS "exerciseId", e."sentence", e."answered"
               FROM "words" w
               JOIN "exercises" e ON e."wordId" = w."id"
               WHERE w."userId" = ? AND w."learnStatus" = ?
               ORDER BY w."lastAskedAt" IS NOT NULL, w."lastAskedAt", w."addedAt", w."seq",
                        e."answered", e."position"
               LIMIT 1"#,
        )
        .bind(user_id.to_string())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        Ok(Some(Exercise {
            id: parse_id(&row, "exerciseId")?,
            word: map_word(&row)?,
            sentence: row.try_get("sentence")?,
            answered: row.try_get("answered")?,
        }))
    }
}

#[async_trait]
impl WordStore for SqliteStore {
    async fn add_word(&self, word: NewWord, sentences: &[String]) -> Result<Word, StoreError> {
        validate_sentences(sentences)?;

        let mut tx = self.pool.begin().await?;

        let owner: Option<String> = sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "id" = ?"#)
            .bind(word.user_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        if owner.is_none() {
            return Err(StoreError::UnknownUser(word.user_id));
        }

        let added_at = now_millis_precision();
        let stored = Word {
            id: WordId::new(),
            user_id: word.user_id,
            spelling: word.spelling,
            definition: word.definition,
            lexical_category: word.lexical_category,
            language: word.language,
            learn_status: LearnStatus::Pending,
            answered_count: 0,
            added_at,
            last_asked_at: None,
        };

        sqlx::query(
            r#"INSERT INTO "words"
               ("id", "userId", "spelling", "definition", "lexicalCategory", "language",
                "learnStatus", "answeredCount", "addedAt", "lastAskedAt")
               VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, NULL)"#,
        )
        .bind(stored.id.to_string())
        .bind(stored.user_id.to_string())
        .bind(&stored.spelling)
        .bind(&stored.definition)
        .bind(&stored.lexical_category)
        .bind(stored.language.as_str())
        .bind(stored.learn_status.as_str())
        .bind(stored.added_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        for (position, sentence) in sentences.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO "exercises" ("id", "wordId", "position", "sentence", "answered")
                   VALUES (?, ?, ?, ?, 0)"#,
            )
            .bind(ExerciseId::new().to_string())
            .bind(stored.id.to_string())
            .bind(position as i64)
            .bind(sentence)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(stored)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self) -> Result<User, StoreError> {
        let user = User { id: UserId::new() };
        sqlx::query(r#"INSERT INTO "users" ("id", "createdAt") VALUES (?, ?)"#)
            .bind(user.id.to_string())
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let found: Option<String> = sqlx::query_scalar(r#"SELECT "id" FROM "users" WHERE "id" = ?"#)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn map_word(row: &SqliteRow) -> Result<Word, StoreError> {
    let language: String = row.try_get("language")?;
    let answered_count: i64 = row.try_get("answeredCount")?;
    let last_asked_at: Option<i64> = row.try_get("lastAskedAt")?;

    Ok(Word {
        id: parse_id(row, "id")?,
        user_id: parse_id(row, "userId")?,
        spelling: row.try_get("spelling")?,
        definition: row.try_get("definition")?,
        lexical_category: row.try_get("lexicalCategory")?,
        language: Language::parse(&language).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        learn_status: parse_status(row)?,
        answered_count: u32::try_from(answered_count)
            .map_err(|_| StoreError::Corrupt(format!("answered count {answered_count}")))?,
        added_at: millis_to_datetime(row.try_get("addedAt")?)?,
        last_asked_at: last_asked_at.map(millis_to_datetime).transpose()?,
    })
}

fn parse_status(row: &SqliteRow) -> Result<LearnStatus, StoreError> {
    let raw: String = row.try_get("learnStatus")?;
    raw.parse().map_err(|e: crate::models::UnknownStatus| StoreError::Corrupt(e.to_string()))
}

fn parse_id<T>(row: &SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = crate::models::IdError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: crate::models::IdError| StoreError::Corrupt(e.to_string()))
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {ms}")))
}

/// Current time truncated to what the database stores, so returned words
/// compare equal to their reloaded form.
fn now_millis_precision() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
