use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::QuizAttempt;
use crate::db::types::QuizMode;

pub(crate) const COLUMNS: &str = "\
    id, user_id, book_id, page_id, score_correct, score_total, percentage, mode, \
    attempt_number, duration_sec, created_at";

/// Serializes attempt numbering for one (user, book, page) scope until the
/// surrounding transaction ends.
pub(crate) async fn acquire_numbering_lock(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    book_id: &str,
    page_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    let key = format!("quiz_attempts:{user_id}:{book_id}:{}", page_id.unwrap_or("-"));
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn next_attempt_number(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    book_id: &str,
    page_id: Option<&str>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "SELECT COALESCE(MAX(attempt_number), 0) + 1
         FROM quiz_attempts
         WHERE user_id = $1 AND book_id = $2 AND page_id IS NOT DISTINCT FROM $3",
    )
    .bind(user_id)
    .bind(book_id)
    .bind(page_id)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreateAttempt<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) book_id: &'a str,
    pub(crate) page_id: Option<&'a str>,
    pub(crate) score_correct: i32,
    pub(crate) score_total: i32,
    pub(crate) percentage: i32,
    pub(crate) mode: QuizMode,
    pub(crate) attempt_number: i32,
    pub(crate) duration_sec: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<QuizAttempt, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "INSERT INTO quiz_attempts (
            id, user_id, book_id, page_id, score_correct, score_total, percentage, mode,
            attempt_number, duration_sec, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.book_id)
    .bind(params.page_id)
    .bind(params.score_correct)
    .bind(params.score_total)
    .bind(params.percentage)
    .bind(params.mode)
    .bind(params.attempt_number)
    .bind(params.duration_sec)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct AttemptFilter<'a> {
    pub(crate) user_id: Option<&'a str>,
    pub(crate) book_id: Option<&'a str>,
    pub(crate) page_id: Option<&'a str>,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &AttemptFilter<'a>) {
    builder.push(" WHERE TRUE");
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(book_id) = filter.book_id {
        builder.push(" AND book_id = ");
        builder.push_bind(book_id);
    }
    if let Some(page_id) = filter.page_id {
        builder.push(" AND page_id = ");
        builder.push_bind(page_id);
    }
}

/// Raw attempt rows, newest first.
pub(crate) async fn list(
    pool: &PgPool,
    filter: AttemptFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM quiz_attempts"));
    push_filters(&mut builder, &filter);
    builder.push(" ORDER BY created_at DESC, attempt_number DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<QuizAttempt>().fetch_all(pool).await
}

/// One row per (user, book): the highest attempt number, latest on ties.
pub(crate) async fn list_latest_per_book(
    pool: &PgPool,
    filter: AttemptFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM (SELECT DISTINCT ON (user_id, book_id) {COLUMNS} FROM quiz_attempts"
    ));
    push_filters(&mut builder, &filter);
    builder.push(
        " ORDER BY user_id, book_id, attempt_number DESC, created_at DESC) latest \
         ORDER BY created_at DESC OFFSET ",
    );
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<QuizAttempt>().fetch_all(pool).await
}

/// Attempts in the order the session aggregator consumes them.
pub(crate) async fn list_chronological(
    pool: &PgPool,
    user_id: &str,
    book_id: Option<&str>,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE user_id = "
    ));
    builder.push_bind(user_id);
    if let Some(book_id) = book_id {
        builder.push(" AND book_id = ");
        builder.push_bind(book_id);
    }
    builder.push(" ORDER BY book_id ASC, created_at ASC, attempt_number ASC");

    builder.build_query_as::<QuizAttempt>().fetch_all(pool).await
}
