use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{resolve_target_user, visible_book, CurrentStaff, CurrentUser};
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Book;
use crate::repositories;
use crate::schemas::badge::{AwardedBadgeResponse, BookCompletionResponse};
use crate::schemas::book::{
    BookBadgeCreate, BookBadgeResponse, BookCreate, BookResponse, BookUpdate, PageCreate,
    PageResponse,
};
use crate::schemas::progress::ProgressResponse;
use crate::services::badge_awards;

#[derive(Debug, Deserialize)]
pub(crate) struct BookListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteQuery {
    #[serde(default)]
    #[serde(alias = "userId")]
    user_id: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/:book_id", get(get_book).patch(update_book).delete(delete_book))
        .route("/:book_id/pages", get(list_pages).post(create_page))
        .route("/:book_id/pages/:page_id", delete(delete_page))
        .route("/:book_id/badges", get(list_book_badges).post(map_badge))
        .route("/:book_id/badges/:badge_id", delete(unmap_badge))
        .route("/:book_id/complete", post(complete_book))
}

async fn existing_book(state: &AppState, book_id: &str) -> Result<Book, ApiError> {
    repositories::books::find_by_id(state.db(), book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch book"))?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))
}

async fn list_books(
    Query(params): Query<BookListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<BookResponse>>, ApiError> {
    let books = repositories::books::list(
        state.db(),
        !user.role.is_staff(),
        params.skip,
        params.limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list books"))?;

    Ok(Json(PaginatedResponse::new(
        books.into_iter().map(BookResponse::from_db).collect(),
        params.skip,
        params.limit,
    )))
}

async fn create_book(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<BookCreate>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let book = repositories::books::create(
        state.db(),
        repositories::books::CreateBook {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            author: payload.author.as_deref(),
            description: payload.description.as_deref(),
            cover_url: payload.cover_url.as_deref(),
            is_published: payload.is_published,
            created_by: &staff.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create book"))?;

    tracing::info!(user_id = %staff.id, book_id = %book.id, action = "book_create", "Book created");

    Ok((StatusCode::CREATED, Json(BookResponse::from_db(book))))
}

async fn get_book(
    Path(book_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = visible_book(&state, &user, &book_id).await?;
    Ok(Json(BookResponse::from_db(book)))
}

async fn update_book(
    Path(book_id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<BookResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::books::update(
        state.db(),
        &book_id,
        repositories::books::UpdateBook {
            title: payload.title.map(|title| title.trim().to_string()),
            author: payload.author,
            description: payload.description,
            cover_url: payload.cover_url,
            is_published: payload.is_published,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update book"))?;

    if !updated {
        return Err(ApiError::NotFound("Book not found".to_string()));
    }

    let book = repositories::books::fetch_one_by_id(state.db(), &book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated book"))?;

    tracing::info!(user_id = %staff.id, book_id = %book.id, action = "book_update", "Book updated");

    Ok(Json(BookResponse::from_db(book)))
}

async fn delete_book(
    Path(book_id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::books::delete(state.db(), &book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete book"))?;

    if !deleted {
        return Err(ApiError::NotFound("Book not found".to_string()));
    }

    tracing::info!(user_id = %staff.id, book_id = %book_id, action = "book_delete", "Book deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn list_pages(
    Path(book_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PageResponse>>, ApiError> {
    visible_book(&state, &user, &book_id).await?;

    let pages = repositories::pages::list_by_book(state.db(), &book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pages"))?;

    Ok(Json(pages.into_iter().map(PageResponse::from_db).collect()))
}

async fn create_page(
    Path(book_id): Path<String>,
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<PageCreate>,
) -> Result<(StatusCode, Json<PageResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    existing_book(&state, &book_id).await?;

    let page = repositories::pages::create(
        state.db(),
        repositories::pages::CreatePage {
            id: &Uuid::new_v4().to_string(),
            book_id: &book_id,
            page_number: payload.page_number,
            content: &payload.content,
            image_url: payload.image_url.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if crate::db::is_unique_violation(&e) {
            ApiError::Conflict(format!("Page {} already exists", payload.page_number))
        } else {
            ApiError::internal(e, "Failed to create page")
        }
    })?;

    Ok((StatusCode::CREATED, Json(PageResponse::from_db(page))))
}

async fn delete_page(
    Path((book_id, page_id)): Path<(String, String)>,
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::pages::delete(state.db(), &book_id, &page_id).await.map_err(|e| {
        if crate::db::is_foreign_key_violation(&e) {
            ApiError::Conflict("Page has recorded quiz attempts".to_string())
        } else {
            ApiError::internal(e, "Failed to delete page")
        }
    })?;

    if !deleted {
        return Err(ApiError::NotFound("Page not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn list_book_badges(
    Path(book_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookBadgeResponse>>, ApiError> {
    visible_book(&state, &user, &book_id).await?;

    let mappings = repositories::book_badges::list_for_book(state.db(), &book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list book badges"))?;

    Ok(Json(mappings.into_iter().map(BookBadgeResponse::from_db).collect()))
}

async fn map_badge(
    Path(book_id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<BookBadgeCreate>,
) -> Result<(StatusCode, Json<BookBadgeResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    existing_book(&state, &book_id).await?;

    let badge = repositories::badges::find_by_id(state.db(), &payload.badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch badge"))?;
    if badge.is_none() {
        return Err(ApiError::NotFound("Badge not found".to_string()));
    }

    let (mapping, created) = repositories::book_badges::create_or_get(
        state.db(),
        repositories::book_badges::CreateMapping {
            id: &Uuid::new_v4().to_string(),
            book_id: &book_id,
            badge_id: &payload.badge_id,
            award_method: payload.award_method,
            completion_threshold: payload.completion_threshold,
            is_enabled: payload.is_enabled,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to map badge to book"))?;

    if created {
        tracing::info!(
            user_id = %staff.id,
            book_id = %book_id,
            badge_id = %payload.badge_id,
            action = "book_badge_map",
            "Badge mapped to book"
        );
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(BookBadgeResponse::from_db(mapping))))
}

async fn unmap_badge(
    Path((book_id, badge_id)): Path<(String, String)>,
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::book_badges::delete(state.db(), &book_id, &badge_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to unmap badge"))?;

    if !deleted {
        return Err(ApiError::NotFound("Book badge mapping not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn complete_book(
    Path(book_id): Path<String>,
    Query(params): Query<CompleteQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<BookCompletionResponse>, ApiError> {
    let target_user = resolve_target_user(&user, params.user_id.as_deref())?;
    visible_book(&state, &user, &book_id).await?;

    let outcome = badge_awards::complete_book(state.db(), target_user, &book_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to complete book"))?;

    let message = match outcome.awarded.len() {
        0 => "Book completed".to_string(),
        1 => "Book completed; 1 badge awarded".to_string(),
        count => format!("Book completed; {count} badges awarded"),
    };

    Ok(Json(BookCompletionResponse {
        success: true,
        message,
        progress: ProgressResponse::from_db(outcome.progress),
        awarded_badges: outcome.awarded.into_iter().map(AwardedBadgeResponse::from_award).collect(),
    }))
}
