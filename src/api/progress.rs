use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{resolve_read_scope, resolve_target_user, visible_book, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::progress::{ProgressQuery, ProgressResponse, ProgressUpdate};
use crate::services::reading_time;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_progress).post(update_progress))
}

async fn list_progress(
    Query(params): Query<ProgressQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProgressResponse>>, ApiError> {
    let user_id = resolve_read_scope(&user, params.user_id.as_deref())?;

    let rows = repositories::progress::list(state.db(), user_id, params.book_id.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list progress"))?;

    Ok(Json(rows.into_iter().map(ProgressResponse::from_db).collect()))
}

async fn update_progress(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProgressUpdate>,
) -> Result<Json<ProgressResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let target_user = resolve_target_user(&user, payload.user_id.as_deref())?;
    visible_book(&state, &user, &payload.book_id).await?;

    let progress =
        reading_time::set_progress(state.db(), target_user, &payload.book_id, payload.percent_complete)
            .await
            .map_err(|e| ApiError::from_service(e, "Failed to update progress"))?;

    tracing::debug!(
        user_id = %progress.user_id,
        book_id = %progress.book_id,
        percent_complete = progress.percent_complete,
        "Progress updated"
    );

    Ok(Json(ProgressResponse::from_db(progress)))
}
