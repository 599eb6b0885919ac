use sqlx::PgPool;

use crate::db::models::BookPage;

const COLUMNS: &str = "id, book_id, page_number, content, image_url, created_at";

pub(crate) async fn list_by_book(pool: &PgPool, book_id: &str) -> Result<Vec<BookPage>, sqlx::Error> {
    sqlx::query_as::<_, BookPage>(&format!(
        "SELECT {COLUMNS} FROM book_pages WHERE book_id = $1 ORDER BY page_number ASC"
    ))
    .bind(book_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_in_book(
    executor: impl sqlx::PgExecutor<'_>,
    book_id: &str,
    page_id: &str,
) -> Result<Option<BookPage>, sqlx::Error> {
    sqlx::query_as::<_, BookPage>(&format!(
        "SELECT {COLUMNS} FROM book_pages WHERE book_id = $1 AND id = $2"
    ))
    .bind(book_id)
    .bind(page_id)
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreatePage<'a> {
    pub(crate) id: &'a str,
    pub(crate) book_id: &'a str,
    pub(crate) page_number: i32,
    pub(crate) content: &'a str,
    pub(crate) image_url: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreatePage<'_>) -> Result<BookPage, sqlx::Error> {
    sqlx::query_as::<_, BookPage>(&format!(
        "INSERT INTO book_pages (id, book_id, page_number, content, image_url, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.book_id)
    .bind(params.page_number)
    .bind(params.content)
    .bind(params.image_url)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, book_id: &str, page_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM book_pages WHERE book_id = $1 AND id = $2")
        .bind(book_id)
        .bind(page_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
