use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Book, BookBadgeMapping, BookPage};
use crate::db::types::AwardMethod;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BookCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) author: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "coverUrl")]
    pub(crate) cover_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BookUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) author: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "coverUrl")]
    pub(crate) cover_url: Option<String>,
    #[serde(default)]
    #[serde(alias = "isPublished")]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BookResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) author: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_published: bool,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl BookResponse {
    pub(crate) fn from_db(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            cover_url: book.cover_url,
            is_published: book.is_published,
            created_by: book.created_by,
            created_at: format_primitive(book.created_at),
            updated_at: format_primitive(book.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PageCreate {
    #[serde(alias = "pageNumber")]
    #[validate(range(min = 1, message = "page_number must be at least 1"))]
    pub(crate) page_number: i32,
    pub(crate) content: String,
    #[serde(default)]
    #[serde(alias = "imageUrl")]
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PageResponse {
    pub(crate) id: String,
    pub(crate) book_id: String,
    pub(crate) page_number: i32,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) created_at: String,
}

impl PageResponse {
    pub(crate) fn from_db(page: BookPage) -> Self {
        Self {
            id: page.id,
            book_id: page.book_id,
            page_number: page.page_number,
            content: page.content,
            image_url: page.image_url,
            created_at: format_primitive(page.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct BookBadgeCreate {
    #[serde(alias = "badgeId")]
    pub(crate) badge_id: String,
    #[serde(default)]
    #[serde(alias = "awardMethod")]
    pub(crate) award_method: AwardMethod,
    #[serde(default = "default_threshold")]
    #[serde(alias = "completionThreshold")]
    #[validate(range(min = 1, max = 100, message = "completion_threshold must be 1-100"))]
    pub(crate) completion_threshold: i32,
    #[serde(default = "default_true")]
    #[serde(alias = "isEnabled")]
    pub(crate) is_enabled: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct BookBadgeResponse {
    pub(crate) id: String,
    pub(crate) book_id: String,
    pub(crate) badge_id: String,
    pub(crate) award_method: AwardMethod,
    pub(crate) completion_threshold: i32,
    pub(crate) is_enabled: bool,
    pub(crate) created_at: String,
}

impl BookBadgeResponse {
    pub(crate) fn from_db(mapping: BookBadgeMapping) -> Self {
        Self {
            id: mapping.id,
            book_id: mapping.book_id,
            badge_id: mapping.badge_id,
            award_method: mapping.award_method,
            completion_threshold: mapping.completion_threshold,
            is_enabled: mapping.is_enabled,
            created_at: format_primitive(mapping.created_at),
        }
    }
}

fn default_threshold() -> i32 {
    100
}

fn default_true() -> bool {
    true
}
