use sqlx::PgPool;
use uuid::Uuid;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{EarnedBadge, MappedBadge, Progress};
use crate::repositories;
use crate::repositories::earned_badges::AwardBadge;
use crate::services::ServiceError;

/// A badge earned by the completion that produced it.
#[derive(Debug, Clone)]
pub(crate) struct AwardedBadge {
    pub(crate) earned: EarnedBadge,
    pub(crate) badge_name: String,
    pub(crate) badge_description: Option<String>,
    pub(crate) badge_icon_url: Option<String>,
}

impl AwardedBadge {
    fn new(earned: EarnedBadge, mapped: MappedBadge) -> Self {
        Self {
            earned,
            badge_name: mapped.badge_name,
            badge_description: mapped.badge_description,
            badge_icon_url: mapped.badge_icon_url,
        }
    }
}

#[derive(Debug)]
pub(crate) struct CompletionOutcome {
    pub(crate) progress: Progress,
    pub(crate) awarded: Vec<AwardedBadge>,
}

/// Marks the book complete for the user and awards every badge mapped to
/// it that the user does not already hold for this book.
///
/// Runs in one transaction: either progress and all new awards are written,
/// or nothing is. Mappings are not filtered by method, enabled flag or
/// threshold; a completion is 100% and satisfies all of them.
pub(crate) async fn complete_book(
    pool: &PgPool,
    user_id: &str,
    book_id: &str,
) -> Result<CompletionOutcome, ServiceError> {
    let mut tx = pool.begin().await?;

    if repositories::users::find_by_id(&mut *tx, user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }
    if repositories::books::find_by_id(&mut *tx, book_id).await?.is_none() {
        return Err(ServiceError::NotFound("Book"));
    }

    let now = primitive_now_utc();
    let progress_id = Uuid::new_v4().to_string();
    let progress =
        repositories::progress::upsert_percent(&mut *tx, &progress_id, user_id, book_id, 100, now)
            .await?;

    let mapped = repositories::book_badges::list_mapped_badges(&mut *tx, book_id).await?;
    let mut awarded = Vec::with_capacity(mapped.len());

    for mapping in mapped {
        let award_id = Uuid::new_v4().to_string();
        let earned = repositories::earned_badges::insert_if_absent(
            &mut *tx,
            AwardBadge {
                id: &award_id,
                user_id,
                badge_id: &mapping.badge_id,
                book_id: Some(book_id),
                awarded_at: now,
                awarded_by: None,
                note: None,
            },
        )
        .await?;

        if let Some(earned) = earned {
            awarded.push(AwardedBadge::new(earned, mapping));
        }
    }

    tx.commit().await?;

    metrics::record_badges_awarded("book_complete", awarded.len());
    tracing::info!(
        user_id,
        book_id,
        awarded = awarded.len(),
        action = "book_complete",
        "Book completed"
    );

    Ok(CompletionOutcome { progress, awarded })
}

pub(crate) struct ManualAward<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) badge_id: &'a str,
    pub(crate) book_id: Option<&'a str>,
    pub(crate) note: Option<&'a str>,
    pub(crate) awarded_by: &'a str,
}

/// Awards a badge outside of book completion. The flag is `true` when a new
/// row was written and `false` when the triple was already earned.
pub(crate) async fn award_badge(
    pool: &PgPool,
    params: ManualAward<'_>,
) -> Result<(EarnedBadge, bool), ServiceError> {
    if repositories::users::find_by_id(pool, params.user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User"));
    }
    if repositories::badges::find_by_id(pool, params.badge_id).await?.is_none() {
        return Err(ServiceError::NotFound("Badge"));
    }
    if let Some(book_id) = params.book_id {
        if repositories::books::find_by_id(pool, book_id).await?.is_none() {
            return Err(ServiceError::NotFound("Book"));
        }
    }

    let award_id = Uuid::new_v4().to_string();
    let inserted = repositories::earned_badges::insert_if_absent(
        pool,
        AwardBadge {
            id: &award_id,
            user_id: params.user_id,
            badge_id: params.badge_id,
            book_id: params.book_id,
            awarded_at: primitive_now_utc(),
            awarded_by: Some(params.awarded_by),
            note: params.note,
        },
    )
    .await?;

    if let Some(earned) = inserted {
        metrics::record_badges_awarded("manual", 1);
        tracing::info!(
            user_id = params.user_id,
            badge_id = params.badge_id,
            book_id = params.book_id,
            awarded_by = params.awarded_by,
            action = "manual_award",
            "Badge awarded"
        );
        return Ok((earned, true));
    }

    let existing = repositories::earned_badges::find_existing(
        pool,
        params.user_id,
        params.badge_id,
        params.book_id,
    )
    .await?
    .ok_or(ServiceError::NotFound("Earned badge"))?;

    Ok((existing, false))
}
