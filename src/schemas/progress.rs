use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Progress, ReadingSession};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProgressUpdate {
    #[serde(alias = "bookId")]
    pub(crate) book_id: String,
    #[serde(alias = "percentComplete")]
    #[validate(range(min = 0, max = 100, message = "percent_complete must be 0-100"))]
    pub(crate) percent_complete: i32,
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressQuery {
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "bookId")]
    pub(crate) book_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) percent_complete: i32,
    pub(crate) total_reading_time: i64,
    pub(crate) last_read_at: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ProgressResponse {
    pub(crate) fn from_db(progress: Progress) -> Self {
        Self {
            id: progress.id,
            user_id: progress.user_id,
            book_id: progress.book_id,
            percent_complete: progress.percent_complete,
            total_reading_time: progress.total_reading_time,
            last_read_at: progress.last_read_at.map(format_primitive),
            created_at: format_primitive(progress.created_at),
            updated_at: format_primitive(progress.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReadingSessionRequest {
    #[serde(alias = "bookId")]
    pub(crate) book_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadingSessionResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) start_time: String,
    pub(crate) end_time: Option<String>,
    pub(crate) total_minutes: Option<i64>,
    pub(crate) created_at: String,
}

impl ReadingSessionResponse {
    pub(crate) fn from_db(session: ReadingSession) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            book_id: session.book_id,
            start_time: format_primitive(session.start_time),
            end_time: session.end_time.map(format_primitive),
            total_minutes: session.total_minutes,
            created_at: format_primitive(session.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReadingEndResponse {
    pub(crate) success: bool,
    pub(crate) elapsed_seconds: i64,
    pub(crate) session: ReadingSessionResponse,
    pub(crate) progress: ProgressResponse,
}
