use sqlx::SqlitePool;

use super::StoreError;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
pub const SCHEMA_VERSION: &str = "1";

/// Splits a script on `;` outside of quoted text.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ';' if !in_single_quote && !in_double_quote => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(out: &mut Vec<String>, raw: &str) {
    let sql = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = sql.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

pub async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    let version: Option<String> =
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.as_deref() == Some(SCHEMA_VERSION) {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for stmt in split_sql_statements(SCHEMA_SQL) {
        sqlx::query(&stmt).execute(&mut *tx).await?;
    }
    sqlx::query(
        r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#,
    )
    .bind(SCHEMA_VERSION)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(())
}
