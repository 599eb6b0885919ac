use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AwardMethod, QuizMode, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Book {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) author: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct BookPage {
    pub(crate) id: String,
    pub(crate) book_id: String,
    pub(crate) page_number: i32,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Badge {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) icon_url: Option<String>,
    pub(crate) is_generic: bool,
    pub(crate) is_active: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct BookBadgeMapping {
    pub(crate) id: String,
    pub(crate) book_id: String,
    pub(crate) badge_id: String,
    pub(crate) award_method: AwardMethod,
    pub(crate) completion_threshold: i32,
    pub(crate) is_enabled: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

/// A mapping row joined to the badge it awards.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct MappedBadge {
    pub(crate) mapping_id: String,
    pub(crate) book_id: String,
    pub(crate) badge_id: String,
    pub(crate) award_method: AwardMethod,
    pub(crate) completion_threshold: i32,
    pub(crate) is_enabled: bool,
    pub(crate) badge_name: String,
    pub(crate) badge_description: Option<String>,
    pub(crate) badge_icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct EarnedBadge {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) badge_id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) awarded_at: PrimitiveDateTime,
    pub(crate) awarded_by: Option<String>,
    pub(crate) note: Option<String>,
}

/// Earned badge with the badge and (optional) book details joined in.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct EarnedBadgeDetail {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) badge_id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) awarded_at: PrimitiveDateTime,
    pub(crate) awarded_by: Option<String>,
    pub(crate) note: Option<String>,
    pub(crate) badge_name: String,
    pub(crate) badge_description: Option<String>,
    pub(crate) badge_icon_url: Option<String>,
    pub(crate) book_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAttempt {
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
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Progress {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) percent_complete: i32,
    pub(crate) total_reading_time: i64,
    pub(crate) last_read_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ReadingSession {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) book_id: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    /// Elapsed seconds despite the column name.
    pub(crate) total_minutes: Option<i64>,
    pub(crate) created_at: PrimitiveDateTime,
}
