use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::{elapsed_seconds, primitive_now_utc};
use crate::db::models::{Progress, ReadingSession};
use crate::repositories;
use crate::services::ServiceError;

/// Returns the open reading session for the pair, opening one if needed.
pub(crate) async fn start(
    pool: &PgPool,
    user_id: &str,
    book_id: &str,
) -> Result<ReadingSession, ServiceError> {
    if repositories::books::find_by_id(pool, book_id).await?.is_none() {
        return Err(ServiceError::NotFound("Book"));
    }

    let session_id = Uuid::new_v4().to_string();
    let opened =
        repositories::reading_sessions::open(pool, &session_id, user_id, book_id, primitive_now_utc())
            .await?;

    let session = repositories::reading_sessions::find_open(pool, user_id, book_id)
        .await?
        .ok_or(ServiceError::NotFound("Reading session"))?;

    if opened {
        tracing::info!(user_id, book_id, session_id = %session.id, "Reading session started");
    }

    Ok(session)
}

#[derive(Debug)]
pub(crate) struct EndedReading {
    pub(crate) session: ReadingSession,
    pub(crate) progress: Progress,
    pub(crate) elapsed_seconds: i64,
}

/// Closes the open session and adds its elapsed seconds to progress.
pub(crate) async fn end(
    pool: &PgPool,
    user_id: &str,
    book_id: &str,
) -> Result<EndedReading, ServiceError> {
    let mut tx = pool.begin().await?;

    let open = repositories::reading_sessions::find_open_for_update(&mut *tx, user_id, book_id)
        .await?
        .ok_or(ServiceError::NotFound("Active reading session"))?;

    let now = primitive_now_utc();
    let elapsed = elapsed_seconds(open.start_time, now);

    let session = repositories::reading_sessions::close(&mut *tx, &open.id, elapsed, now).await?;
    let progress_id = Uuid::new_v4().to_string();
    let progress = repositories::progress::add_reading_time(
        &mut *tx,
        &progress_id,
        user_id,
        book_id,
        elapsed,
        now,
    )
    .await?;

    tx.commit().await?;

    metrics::record_reading_seconds(elapsed);
    tracing::info!(user_id, book_id, elapsed_seconds = elapsed, "Reading session ended");

    Ok(EndedReading { session, progress, elapsed_seconds: elapsed })
}

/// Overwrites the completion percentage; reading time is kept.
pub(crate) async fn set_progress(
    pool: &PgPool,
    user_id: &str,
    book_id: &str,
    percent_complete: i32,
) -> Result<Progress, ServiceError> {
    if repositories::users::find_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }
    if repositories::books::find_by_id(pool, book_id).await?.is_none() {
        return Err(ServiceError::NotFound("Book"));
    }

    let progress_id = Uuid::new_v4().to_string();
    let progress = repositories::progress::upsert_percent(
        pool,
        &progress_id,
        user_id,
        book_id,
        percent_complete.clamp(0, 100),
        primitive_now_utc(),
    )
    .await?;

    Ok(progress)
}
