use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Book;

const COLUMNS: &str =
    "id, title, author, description, cover_url, is_published, created_by, created_at, updated_at";

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Book, sqlx::Error> {
    sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    published_only: bool,
    skip: i64,
    limit: i64,
) -> Result<Vec<Book>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM books"));
    if published_only {
        builder.push(" WHERE is_published = TRUE");
    }
    builder.push(" ORDER BY title ASC, created_at ASC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Book>().fetch_all(pool).await
}

pub(crate) struct CreateBook<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) author: Option<&'a str>,
    pub(crate) description: Option<&'a str>,
    pub(crate) cover_url: Option<&'a str>,
    pub(crate) is_published: bool,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateBook<'_>) -> Result<Book, sqlx::Error> {
    sqlx::query_as::<_, Book>(&format!(
        "INSERT INTO books (
            id, title, author, description, cover_url, is_published, created_by,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.author)
    .bind(params.description)
    .bind(params.cover_url)
    .bind(params.is_published)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateBook {
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_published: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateBook) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE books SET
            title = COALESCE($1, title),
            author = COALESCE($2, author),
            description = COALESCE($3, description),
            cover_url = COALESCE($4, cover_url),
            is_published = COALESCE($5, is_published),
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.title)
    .bind(params.author)
    .bind(params.description)
    .bind(params.cover_url)
    .bind(params.is_published)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
