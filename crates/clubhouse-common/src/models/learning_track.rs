//! Learning tracks: the study paths applicants can express interest in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "difficulty", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearningTrack {
    pub id: Uuid,
    pub name: String,
    /// URL key derived from the name
    pub slug: String,
    pub short_desc: Option<String>,
    pub long_desc: Option<String>,
    /// Human-readable duration, e.g. "6 months"
    pub duration: Option<String>,
    pub difficulty: Difficulty,
    pub icon: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateLearningTrackRequest {
    #[validate(length(min = 2, max = 100, message = "Track name must be 2-100 characters"))]
    pub name: String,

    #[validate(length(max = 280))]
    pub short_desc: Option<String>,

    pub long_desc: Option<String>,

    #[validate(length(max = 64))]
    pub duration: Option<String>,

    pub difficulty: Difficulty,

    pub icon: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Closed set of updatable fields. The slug is never rewritten.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateLearningTrackRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 280))]
    pub short_desc: Option<String>,

    pub long_desc: Option<String>,

    #[validate(length(max = 64))]
    pub duration: Option<String>,

    pub difficulty: Option<Difficulty>,

    pub icon: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct LearningTrackFilter {
    /// Case-insensitive match on name or short description
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub is_active: Option<bool>,
}
