use sqlx::PgPool;

use crate::db::models::{EarnedBadge, EarnedBadgeDetail};

const COLUMNS: &str = "id, user_id, badge_id, book_id, awarded_at, awarded_by, note";

pub(crate) struct AwardBadge<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) badge_id: &'a str,
    pub(crate) book_id: Option<&'a str>,
    pub(crate) awarded_at: time::PrimitiveDateTime,
    pub(crate) awarded_by: Option<&'a str>,
    pub(crate) note: Option<&'a str>,
}

/// Inserts the award unless the (user, badge, book) triple already holds
/// one. Returns `None` when the badge was already earned.
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: AwardBadge<'_>,
) -> Result<Option<EarnedBadge>, sqlx::Error> {
    sqlx::query_as::<_, EarnedBadge>(&format!(
        "INSERT INTO earned_badges (id, user_id, badge_id, book_id, awarded_at, awarded_by, note)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         ON CONFLICT (user_id, badge_id, (COALESCE(book_id, ''))) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.badge_id)
    .bind(params.book_id)
    .bind(params.awarded_at)
    .bind(params.awarded_by)
    .bind(params.note)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_existing(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    badge_id: &str,
    book_id: Option<&str>,
) -> Result<Option<EarnedBadge>, sqlx::Error> {
    sqlx::query_as::<_, EarnedBadge>(&format!(
        "SELECT {COLUMNS} FROM earned_badges
         WHERE user_id = $1 AND badge_id = $2 AND COALESCE(book_id, '') = COALESCE($3, '')"
    ))
    .bind(user_id)
    .bind(badge_id)
    .bind(book_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn count_for_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM earned_badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<EarnedBadgeDetail>, sqlx::Error> {
    sqlx::query_as::<_, EarnedBadgeDetail>(
        "SELECT eb.id, eb.user_id, eb.badge_id, eb.book_id, eb.awarded_at, eb.awarded_by,
                eb.note, b.name AS badge_name, b.description AS badge_description,
                b.icon_url AS badge_icon_url, bk.title AS book_title
         FROM earned_badges eb
         JOIN badges b ON b.id = eb.badge_id
         LEFT JOIN books bk ON bk.id = eb.book_id
         WHERE eb.user_id = $1
         ORDER BY eb.awarded_at DESC, eb.id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
