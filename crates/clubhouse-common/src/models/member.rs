//! Member model: the profile created when an application is approved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A club member's profile. One per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub student_id: String,
    pub department_id: Uuid,
    pub session_id: Uuid,
    pub learning_track_id: Option<Uuid>,
    pub profile_image: Option<String>,

    /// When the application was approved
    pub joined_at: DateTime<Utc>,
}
