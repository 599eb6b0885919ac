use sqlx::PgPool;

use crate::db::models::Badge;

const COLUMNS: &str =
    "id, name, description, icon_url, is_generic, is_active, created_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Badge>, sqlx::Error> {
    sqlx::query_as::<_, Badge>(&format!("SELECT {COLUMNS} FROM badges WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Badge, sqlx::Error> {
    sqlx::query_as::<_, Badge>(&format!("SELECT {COLUMNS} FROM badges WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Badge>, sqlx::Error> {
    let filter = if active_only { " WHERE is_active = TRUE" } else { "" };
    sqlx::query_as::<_, Badge>(&format!(
        "SELECT {COLUMNS} FROM badges{filter} ORDER BY name ASC, created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateBadge<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) icon_url: Option<&'a str>,
    pub(crate) is_generic: bool,
    pub(crate) is_active: bool,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateBadge<'_>) -> Result<Badge, sqlx::Error> {
    sqlx::query_as::<_, Badge>(&format!(
        "INSERT INTO badges (
            id, name, description, icon_url, is_generic, is_active, created_by,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.icon_url)
    .bind(params.is_generic)
    .bind(params.is_active)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateBadge {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) icon_url: Option<String>,
    pub(crate) is_generic: Option<bool>,
    pub(crate) is_active: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateBadge) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE badges SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            icon_url = COALESCE($3, icon_url),
            is_generic = COALESCE($4, is_generic),
            is_active = COALESCE($5, is_active),
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.name)
    .bind(params.description)
    .bind(params.icon_url)
    .bind(params.is_generic)
    .bind(params.is_active)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the badge; mappings and earned badges go with it via cascade.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM badges WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
