use crate::db::models::ReadingSession;

const COLUMNS: &str = "id, user_id, book_id, start_time, end_time, total_minutes, created_at";

pub(crate) async fn find_open(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    book_id: &str,
) -> Result<Option<ReadingSession>, sqlx::Error> {
    sqlx::query_as::<_, ReadingSession>(&format!(
        "SELECT {COLUMNS} FROM reading_sessions
         WHERE user_id = $1 AND book_id = $2 AND end_time IS NULL"
    ))
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(executor)
    .await
}

/// Locks and returns the open session so two concurrent `end` calls cannot
/// both close it.
pub(crate) async fn find_open_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    book_id: &str,
) -> Result<Option<ReadingSession>, sqlx::Error> {
    sqlx::query_as::<_, ReadingSession>(&format!(
        "SELECT {COLUMNS} FROM reading_sessions
         WHERE user_id = $1 AND book_id = $2 AND end_time IS NULL
         FOR UPDATE"
    ))
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(executor)
    .await
}

/// Opens a session unless one is already open for the pair; returns `false`
/// when the insert was skipped.
pub(crate) async fn open(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    user_id: &str,
    book_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO reading_sessions (id, user_id, book_id, start_time, created_at)
         VALUES ($1,$2,$3,$4,$4)
         ON CONFLICT (user_id, book_id) WHERE end_time IS NULL DO NOTHING",
    )
    .bind(id)
    .bind(user_id)
    .bind(book_id)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn close(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    elapsed_seconds: i64,
    now: time::PrimitiveDateTime,
) -> Result<ReadingSession, sqlx::Error> {
    sqlx::query_as::<_, ReadingSession>(&format!(
        "UPDATE reading_sessions SET end_time = $1, total_minutes = $2
         WHERE id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(elapsed_seconds)
    .bind(id)
    .fetch_one(executor)
    .await
}
