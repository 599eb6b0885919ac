use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Progress;

const COLUMNS: &str = "\
    id, user_id, book_id, percent_complete, total_reading_time, last_read_at, \
    created_at, updated_at";

pub(crate) async fn list(
    pool: &PgPool,
    user_id: Option<&str>,
    book_id: Option<&str>,
) -> Result<Vec<Progress>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM progress WHERE TRUE"));
    if let Some(user_id) = user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(book_id) = book_id {
        builder.push(" AND book_id = ");
        builder.push_bind(book_id);
    }
    builder.push(" ORDER BY last_read_at DESC NULLS LAST, updated_at DESC");

    builder.build_query_as::<Progress>().fetch_all(pool).await
}

/// Sets `percent_complete` for the pair, creating the row when absent.
/// Reading time is left untouched.
pub(crate) async fn upsert_percent(
    executor: impl sqlx::PgExecutor<'_>,
    new_id: &str,
    user_id: &str,
    book_id: &str,
    percent_complete: i32,
    now: time::PrimitiveDateTime,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "INSERT INTO progress (
            id, user_id, book_id, percent_complete, total_reading_time, last_read_at,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,0,$5,$5,$5)
        ON CONFLICT (user_id, book_id) DO UPDATE SET
            percent_complete = EXCLUDED.percent_complete,
            last_read_at = EXCLUDED.last_read_at,
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(new_id)
    .bind(user_id)
    .bind(book_id)
    .bind(percent_complete)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Adds `seconds` to the cumulative reading time, creating the row at 0%
/// when absent.
pub(crate) async fn add_reading_time(
    executor: impl sqlx::PgExecutor<'_>,
    new_id: &str,
    user_id: &str,
    book_id: &str,
    seconds: i64,
    now: time::PrimitiveDateTime,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "INSERT INTO progress (
            id, user_id, book_id, percent_complete, total_reading_time, last_read_at,
            created_at, updated_at
        ) VALUES ($1,$2,$3,0,$4,$5,$5,$5)
        ON CONFLICT (user_id, book_id) DO UPDATE SET
            total_reading_time = progress.total_reading_time + EXCLUDED.total_reading_time,
            last_read_at = EXCLUDED.last_read_at,
            updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}"
    ))
    .bind(new_id)
    .bind(user_id)
    .bind(book_id)
    .bind(seconds)
    .bind(now)
    .fetch_one(executor)
    .await
}
