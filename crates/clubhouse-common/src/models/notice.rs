//! Notices posted by admins to the club board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateNoticeRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoticeRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,

    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeFilter {
    /// Case-insensitive substring on the title
    pub title: Option<String>,
    /// `None` for every notice, `Some(true)` for the public board
    pub published: Option<bool>,
}
