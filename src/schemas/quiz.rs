use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::QuizAttempt;
use crate::db::types::QuizMode;
use crate::services::quiz_sessions::QuizSession;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizAttemptCreate {
    #[serde(alias = "bookId")]
    #[validate(length(min = 1, message = "book_id must not be empty"))]
    pub(crate) book_id: String,
    #[serde(default)]
    #[serde(alias = "pageId")]
    pub(crate) page_id: Option<String>,
    #[serde(alias = "scoreCorrect")]
    #[validate(range(min = 0, message = "score_correct must be non-negative"))]
    pub(crate) score_correct: i32,
    #[serde(alias = "scoreTotal")]
    #[validate(range(min = 1, message = "score_total must be positive"))]
    pub(crate) score_total: i32,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "percentage must be 0-100"))]
    pub(crate) percentage: Option<i32>,
    #[serde(default)]
    pub(crate) mode: Option<QuizMode>,
    #[serde(default)]
    #[serde(alias = "durationSec")]
    pub(crate) duration_sec: Option<i64>,
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizAttemptQuery {
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "bookId")]
    pub(crate) book_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "pageId")]
    pub(crate) page_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "latestPerBook")]
    pub(crate) latest_per_book: bool,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizSessionQuery {
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "bookId")]
    pub(crate) book_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizAttemptResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) page_id: Option<String>,
    pub(crate) score_correct: i32,
    pub(crate) score_total: i32,
    pub(crate) percentage: i32,
    pub(crate) mode: QuizMode,
    pub(crate) attempt_number: i32,
    pub(crate) duration_sec: i32,
    pub(crate) created_at: String,
}

impl QuizAttemptResponse {
    pub(crate) fn from_db(attempt: QuizAttempt) -> Self {
        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            book_id: attempt.book_id,
            page_id: attempt.page_id,
            score_correct: attempt.score_correct,
            score_total: attempt.score_total,
            percentage: attempt.percentage,
            mode: attempt.mode,
            attempt_number: attempt.attempt_number,
            duration_sec: attempt.duration_sec,
            created_at: format_primitive(attempt.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizAttemptCreated {
    pub(crate) success: bool,
    pub(crate) attempt: QuizAttemptResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSessionResponse {
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) start_at: String,
    pub(crate) end_at: String,
    pub(crate) attempt_count: u32,
    pub(crate) total_correct: i64,
    pub(crate) total_total: i64,
    pub(crate) percentage: i32,
    pub(crate) mode: QuizMode,
}

impl QuizSessionResponse {
    pub(crate) fn from_session(session: QuizSession) -> Self {
        Self {
            user_id: session.user_id,
            book_id: session.book_id,
            start_at: format_primitive(session.start_at),
            end_at: format_primitive(session.end_at),
            attempt_count: session.attempt_count,
            total_correct: session.total_correct,
            total_total: session.total_total,
            percentage: session.percentage,
            mode: session.mode,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LatestSessionResponse {
    pub(crate) session: Option<QuizSessionResponse>,
}
