use sqlx::PgPool;

use crate::db::models::{BookBadgeMapping, MappedBadge};
use crate::db::types::AwardMethod;

const COLUMNS: &str =
    "id, book_id, badge_id, award_method, completion_threshold, is_enabled, created_at";

pub(crate) async fn list_for_book(
    pool: &PgPool,
    book_id: &str,
) -> Result<Vec<BookBadgeMapping>, sqlx::Error> {
    sqlx::query_as::<_, BookBadgeMapping>(&format!(
        "SELECT {COLUMNS} FROM book_badges WHERE book_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(book_id)
    .fetch_all(pool)
    .await
}

/// Every mapping of `book_id` joined to its badge, regardless of method or
/// enabled flag.
pub(crate) async fn list_mapped_badges(
    executor: impl sqlx::PgExecutor<'_>,
    book_id: &str,
) -> Result<Vec<MappedBadge>, sqlx::Error> {
    sqlx::query_as::<_, MappedBadge>(
        "SELECT bb.id AS mapping_id, bb.book_id, bb.badge_id, bb.award_method,
                bb.completion_threshold, bb.is_enabled,
                b.name AS badge_name, b.description AS badge_description,
                b.icon_url AS badge_icon_url
         FROM book_badges bb
         JOIN badges b ON b.id = bb.badge_id
         WHERE bb.book_id = $1
         ORDER BY bb.created_at ASC, bb.id ASC",
    )
    .bind(book_id)
    .fetch_all(executor)
    .await
}

pub(crate) struct CreateMapping<'a> {
    pub(crate) id: &'a str,
    pub(crate) book_id: &'a str,
    pub(crate) badge_id: &'a str,
    pub(crate) award_method: AwardMethod,
    pub(crate) completion_threshold: i32,
    pub(crate) is_enabled: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Inserts the mapping, or returns the one already present for the
/// (book, badge) pair. The flag is `true` when a row was created.
pub(crate) async fn create_or_get(
    pool: &PgPool,
    params: CreateMapping<'_>,
) -> Result<(BookBadgeMapping, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, BookBadgeMapping>(&format!(
        "INSERT INTO book_badges (
            id, book_id, badge_id, award_method, completion_threshold, is_enabled, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        ON CONFLICT (book_id, badge_id) DO NOTHING
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.book_id)
    .bind(params.badge_id)
    .bind(params.award_method)
    .bind(params.completion_threshold)
    .bind(params.is_enabled)
    .bind(params.created_at)
    .fetch_optional(pool)
    .await?;

    if let Some(mapping) = inserted {
        return Ok((mapping, true));
    }

    let existing = sqlx::query_as::<_, BookBadgeMapping>(&format!(
        "SELECT {COLUMNS} FROM book_badges WHERE book_id = $1 AND badge_id = $2"
    ))
    .bind(params.book_id)
    .bind(params.badge_id)
    .fetch_one(pool)
    .await?;

    Ok((existing, false))
}

pub(crate) async fn delete(pool: &PgPool, book_id: &str, badge_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM book_badges WHERE book_id = $1 AND badge_id = $2")
        .bind(book_id)
        .bind(badge_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
