use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{resolve_read_scope, resolve_target_user, visible_book, CurrentUser};
use crate::api::pagination::PaginatedResponse;
use crate::api::validation::{clamp_duration, validate_scores};
use crate::core::state::AppState;
use crate::repositories;
use crate::repositories::quiz_attempts::AttemptFilter;
use crate::schemas::quiz::{
    LatestSessionResponse, QuizAttemptCreate, QuizAttemptCreated, QuizAttemptQuery,
    QuizAttemptResponse, QuizSessionQuery, QuizSessionResponse,
};
use crate::services::quiz_attempts::{record_attempt, NewAttempt};
use crate::services::quiz_sessions::{group_sessions_by_book, latest_session};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attempts).post(create_attempt))
        .route("/sessions", get(list_sessions))
        .route("/sessions/latest", get(get_latest_session))
}

async fn create_attempt(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuizAttemptCreate>,
) -> Result<(StatusCode, Json<QuizAttemptCreated>), ApiError> {
    validate_scores(payload.score_correct, payload.score_total)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let target_user = resolve_target_user(&user, payload.user_id.as_deref())?;
    visible_book(&state, &user, &payload.book_id).await?;
    let duration_sec =
        clamp_duration(payload.duration_sec, state.settings().quiz().max_duration_seconds);

    let attempt = record_attempt(
        state.db(),
        NewAttempt {
            user_id: target_user,
            book_id: &payload.book_id,
            page_id: payload.page_id.as_deref(),
            score_correct: payload.score_correct,
            score_total: payload.score_total,
            percentage: payload.percentage,
            mode: payload.mode.unwrap_or_default(),
            duration_sec,
        },
    )
    .await
    .map_err(|e| ApiError::from_service(e, "Failed to record quiz attempt"))?;

    Ok((
        StatusCode::CREATED,
        Json(QuizAttemptCreated { success: true, attempt: QuizAttemptResponse::from_db(attempt) }),
    ))
}

async fn list_attempts(
    Query(params): Query<QuizAttemptQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<QuizAttemptResponse>>, ApiError> {
    let user_id = resolve_read_scope(&user, params.user_id.as_deref())?;
    let filter = AttemptFilter {
        user_id,
        book_id: params.book_id.as_deref(),
        page_id: params.page_id.as_deref(),
    };

    let attempts = if params.latest_per_book {
        repositories::quiz_attempts::list_latest_per_book(
            state.db(),
            filter,
            params.skip,
            params.limit,
        )
        .await
    } else {
        repositories::quiz_attempts::list(state.db(), filter, params.skip, params.limit).await
    }
    .map_err(|e| ApiError::internal(e, "Failed to list quiz attempts"))?;

    Ok(Json(PaginatedResponse::new(
        attempts.into_iter().map(QuizAttemptResponse::from_db).collect(),
        params.skip,
        params.limit,
    )))
}

async fn list_sessions(
    Query(params): Query<QuizSessionQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizSessionResponse>>, ApiError> {
    let target_user = resolve_target_user(&user, params.user_id.as_deref())?;

    let attempts = repositories::quiz_attempts::list_chronological(
        state.db(),
        target_user,
        params.book_id.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load quiz attempts"))?;

    let sessions = group_sessions_by_book(&attempts, state.settings().quiz().session_gap());
    Ok(Json(sessions.into_iter().map(QuizSessionResponse::from_session).collect()))
}

async fn get_latest_session(
    Query(params): Query<QuizSessionQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LatestSessionResponse>, ApiError> {
    let target_user = resolve_target_user(&user, params.user_id.as_deref())?;
    let book_id = params
        .book_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("book_id is required".to_string()))?;

    let attempts =
        repositories::quiz_attempts::list_chronological(state.db(), target_user, Some(book_id))
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load quiz attempts"))?;

    let session = latest_session(&attempts, state.settings().quiz().session_gap());
    Ok(Json(LatestSessionResponse { session: session.map(QuizSessionResponse::from_session) }))
}

#[cfg(test)]
mod tests;
