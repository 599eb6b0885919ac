use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::QuizAttempt;
use crate::db::types::QuizMode;
use crate::repositories;
use crate::repositories::quiz_attempts::CreateAttempt;
use crate::services::quiz_sessions::rounded_percentage;
use crate::services::ServiceError;

/// An already validated submission.
#[derive(Debug)]
pub(crate) struct NewAttempt<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) book_id: &'a str,
    pub(crate) page_id: Option<&'a str>,
    pub(crate) score_correct: i32,
    pub(crate) score_total: i32,
    pub(crate) percentage: Option<i32>,
    pub(crate) mode: QuizMode,
    pub(crate) duration_sec: i32,
}

/// Persists one attempt with the next attempt number for its
/// (user, book, page) scope.
pub(crate) async fn record_attempt(
    pool: &PgPool,
    attempt: NewAttempt<'_>,
) -> Result<QuizAttempt, ServiceError> {
    let mut tx = pool.begin().await?;

    if repositories::users::find_by_id(&mut *tx, attempt.user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }
    if repositories::books::find_by_id(&mut *tx, attempt.book_id).await?.is_none() {
        return Err(ServiceError::NotFound("Book"));
    }
    if let Some(page_id) = attempt.page_id {
        if repositories::pages::find_in_book(&mut *tx, attempt.book_id, page_id).await?.is_none() {
            return Err(ServiceError::NotFound("Page"));
        }
    }

    repositories::quiz_attempts::acquire_numbering_lock(
        &mut *tx,
        attempt.user_id,
        attempt.book_id,
        attempt.page_id,
    )
    .await?;
    let attempt_number = repositories::quiz_attempts::next_attempt_number(
        &mut *tx,
        attempt.user_id,
        attempt.book_id,
        attempt.page_id,
    )
    .await?;

    let percentage = attempt.percentage.unwrap_or_else(|| {
        rounded_percentage(attempt.score_correct.into(), attempt.score_total.into())
    });

    let id = Uuid::new_v4().to_string();
    let created = repositories::quiz_attempts::create(
        &mut *tx,
        CreateAttempt {
            id: &id,
            user_id: attempt.user_id,
            book_id: attempt.book_id,
            page_id: attempt.page_id,
            score_correct: attempt.score_correct,
            score_total: attempt.score_total,
            percentage,
            mode: attempt.mode,
            attempt_number,
            duration_sec: attempt.duration_sec,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    tx.commit().await?;

    metrics::record_quiz_attempt(created.mode.as_str());
    tracing::info!(
        user_id = %created.user_id,
        book_id = %created.book_id,
        attempt_number = created.attempt_number,
        percentage = created.percentage,
        "Quiz attempt recorded"
    );

    Ok(created)
}
