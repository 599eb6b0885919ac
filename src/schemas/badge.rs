use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Badge, EarnedBadge, EarnedBadgeDetail};
use crate::schemas::progress::ProgressResponse;
use crate::services::badge_awards::AwardedBadge;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BadgeCreate {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "iconUrl")]
    pub(crate) icon_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "isGeneric")]
    pub(crate) is_generic: bool,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BadgeUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "iconUrl")]
    pub(crate) icon_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "isGeneric")]
    pub(crate) is_generic: Option<bool>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BadgeListQuery {
    #[serde(default)]
    #[serde(alias = "activeOnly")]
    pub(crate) active_only: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct BadgeResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) icon_url: Option<String>,
    pub(crate) is_generic: bool,
    pub(crate) is_active: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl BadgeResponse {
    pub(crate) fn from_db(badge: Badge) -> Self {
        Self {
            id: badge.id,
            name: badge.name,
            description: badge.description,
            icon_url: badge.icon_url,
            is_generic: badge.is_generic,
            is_active: badge.is_active,
            created_by: badge.created_by,
            created_at: format_primitive(badge.created_at),
            updated_at: format_primitive(badge.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AwardBadgeRequest {
    #[serde(alias = "badgeId")]
    #[validate(length(min = 1, message = "badge_id must not be empty"))]
    pub(crate) badge_id: String,
    #[serde(default)]
    #[serde(alias = "bookId")]
    pub(crate) book_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "note must be at most 1000 characters"))]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EarnedBadgeResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) badge_id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) awarded_at: String,
    pub(crate) awarded_by: Option<String>,
    pub(crate) note: Option<String>,
}

impl EarnedBadgeResponse {
    pub(crate) fn from_db(earned: EarnedBadge) -> Self {
        Self {
            id: earned.id,
            user_id: earned.user_id,
            badge_id: earned.badge_id,
            book_id: earned.book_id,
            awarded_at: format_primitive(earned.awarded_at),
            awarded_by: earned.awarded_by,
            note: earned.note,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AwardBadgeResponse {
    pub(crate) success: bool,
    pub(crate) created: bool,
    pub(crate) earned_badge: EarnedBadgeResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct EarnedBadgeDetailResponse {
    pub(crate) id: String,
    pub(crate) badge_id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) awarded_at: String,
    pub(crate) awarded_by: Option<String>,
    pub(crate) note: Option<String>,
    pub(crate) badge_name: String,
    pub(crate) badge_description: Option<String>,
    pub(crate) badge_icon_url: Option<String>,
    pub(crate) book_title: Option<String>,
}

impl EarnedBadgeDetailResponse {
    pub(crate) fn from_db(detail: EarnedBadgeDetail) -> Self {
        Self {
            id: detail.id,
            badge_id: detail.badge_id,
            book_id: detail.book_id,
            awarded_at: format_primitive(detail.awarded_at),
            awarded_by: detail.awarded_by,
            note: detail.note,
            badge_name: detail.badge_name,
            badge_description: detail.badge_description,
            badge_icon_url: detail.badge_icon_url,
            book_title: detail.book_title,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserBadgesResponse {
    pub(crate) user_id: String,
    pub(crate) total_count: i64,
    pub(crate) items: Vec<EarnedBadgeDetailResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AwardedBadgeResponse {
    pub(crate) id: String,
    pub(crate) badge_id: String,
    pub(crate) book_id: Option<String>,
    pub(crate) awarded_at: String,
    pub(crate) badge_name: String,
    pub(crate) badge_description: Option<String>,
    pub(crate) badge_icon_url: Option<String>,
}

impl AwardedBadgeResponse {
    pub(crate) fn from_award(awarded: AwardedBadge) -> Self {
        Self {
            id: awarded.earned.id,
            badge_id: awarded.earned.badge_id,
            book_id: awarded.earned.book_id,
            awarded_at: format_primitive(awarded.earned.awarded_at),
            badge_name: awarded.badge_name,
            badge_description: awarded.badge_description,
            badge_icon_url: awarded.badge_icon_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BookCompletionResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) progress: ProgressResponse,
    pub(crate) awarded_badges: Vec<AwardedBadgeResponse>,
}

fn default_true() -> bool {
    true
}
