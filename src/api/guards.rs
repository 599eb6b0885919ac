use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Book, User};
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
/// Admin or teacher.
pub(crate) struct CurrentStaff(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role.is_staff() {
            Ok(CurrentStaff(user))
        } else {
            Err(ApiError::Forbidden("Teacher or admin access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Admin {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

/// Resolves whose data a request acts on. Students are pinned to
/// themselves; staff default to themselves but may name any user.
pub(crate) fn resolve_target_user<'a>(
    user: &'a User,
    requested: Option<&'a str>,
) -> Result<&'a str, ApiError> {
    match requested {
        None => Ok(&user.id),
        Some(requested) if requested == user.id => Ok(&user.id),
        Some(requested) if user.role.is_staff() => Ok(requested),
        Some(_) => Err(ApiError::Forbidden("Students can only access their own records")),
    }
}

/// Like [`resolve_target_user`], but staff reads without a filter see every
/// user instead of only themselves.
pub(crate) fn resolve_read_scope<'a>(
    user: &'a User,
    requested: Option<&'a str>,
) -> Result<Option<&'a str>, ApiError> {
    if user.role.is_staff() {
        return Ok(requested);
    }
    resolve_target_user(user, requested).map(Some)
}

/// Loads a book the caller may see. Unpublished books are hidden from
/// students on reads and on every write that names a book.
pub(crate) async fn visible_book(
    state: &AppState,
    user: &User,
    book_id: &str,
) -> Result<Book, ApiError> {
    let book = repositories::books::find_by_id(state.db(), book_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch book"))?;

    match book {
        Some(book) if book.is_published || user.role.is_staff() => Ok(book),
        _ => Err(ApiError::NotFound("Book not found".to_string())),
    }
}
