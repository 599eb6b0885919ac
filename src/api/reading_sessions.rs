use axum::{extract::State, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{visible_book, CurrentUser};
use crate::core::state::AppState;
use crate::schemas::progress::{
    ProgressResponse, ReadingEndResponse, ReadingSessionRequest, ReadingSessionResponse,
};
use crate::services::reading_time;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/start", post(start_reading)).route("/end", post(end_reading))
}

async fn start_reading(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ReadingSessionRequest>,
) -> Result<Json<ReadingSessionResponse>, ApiError> {
    visible_book(&state, &user, &payload.book_id).await?;

    let session = reading_time::start(state.db(), &user.id, &payload.book_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to start reading session"))?;

    Ok(Json(ReadingSessionResponse::from_db(session)))
}

async fn end_reading(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ReadingSessionRequest>,
) -> Result<Json<ReadingEndResponse>, ApiError> {
    let ended = reading_time::end(state.db(), &user.id, &payload.book_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to end reading session"))?;

    Ok(Json(ReadingEndResponse {
        success: true,
        elapsed_seconds: ended.elapsed_seconds,
        session: ReadingSessionResponse::from_db(ended.session),
        progress: ProgressResponse::from_db(ended.progress),
    }))
}

#[cfg(test)]
mod tests;
