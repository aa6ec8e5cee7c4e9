//! Membership application: a user's request to become a club member.
//!
//! One row per user, ever. A rejected application is rewritten in place when
//! its owner submits again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Review state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipApplication {
    pub id: Uuid,

    /// Unique: one application per user
    pub user_id: Uuid,

    pub student_id: String,
    pub department_id: Uuid,
    pub session_id: Uuid,
    pub learning_track_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub motivation: Option<String>,
    pub interested_areas: Vec<String>,

    pub status: ApplicationStatus,

    /// Set when an admin rejects; cleared on resubmission
    pub review_comment: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application row joined with its applicant, as shown in the admin list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ApplicationListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: MembershipApplication,
    pub applicant_first_name: String,
    pub applicant_last_name: String,
    pub applicant_email: String,
}

/// Submission payload. Unknown fields are rejected instead of being passed to storage.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SubmitApplicationRequest {
    #[validate(length(min = 1, max = 32, message = "Student ID must be 1-32 characters"))]
    pub student_id: String,

    pub department_id: Uuid,

    pub session_id: Uuid,

    pub learning_track_id: Option<Uuid>,

    #[validate(length(min = 6, max = 20, message = "Phone number must be 6-20 characters"))]
    pub phone_number: Option<String>,

    #[validate(url(message = "Profile image must be a URL"))]
    pub profile_image: Option<String>,

    #[validate(length(max = 2000, message = "Motivation must be at most 2000 characters"))]
    pub motivation: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 interested areas"))]
    pub interested_areas: Vec<String>,
}

/// Admin rejection payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectApplicationRequest {
    /// Checked by the lifecycle service; blank comments are rejected there
    #[serde(default)]
    pub review_comment: String,
}

/// Columns the admin list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
    StudentId,
}

impl ApplicationSortField {
    pub fn column(self) -> &'static str {
        match self {
            ApplicationSortField::CreatedAt => "a.created_at",
            ApplicationSortField::UpdatedAt => "a.updated_at",
            ApplicationSortField::Status => "a.status",
            ApplicationSortField::StudentId => "a.student_id",
        }
    }
}

/// Closed set of filters accepted by the admin application list.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// Case-insensitive substring on applicant name, email or student ID
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub department_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub learning_track_id: Option<Uuid>,
    pub sort_by: ApplicationSortField,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_requires_core_fields() {
        let raw = r#"{"student_id":"S1","department_id":"0191d6a8-1c2b-7000-8000-000000000001"}"#;
        assert!(serde_json::from_str::<SubmitApplicationRequest>(raw).is_err());
    }

    #[test]
    fn test_submit_request_rejects_unknown_fields() {
        let raw = r#"{
            "student_id":"S1",
            "department_id":"0191d6a8-1c2b-7000-8000-000000000001",
            "session_id":"0191d6a8-1c2b-7000-8000-000000000002",
            "status":"APPROVED"
        }"#;
        assert!(serde_json::from_str::<SubmitApplicationRequest>(raw).is_err());
    }

    #[test]
    fn test_submit_request_defaults_optional_fields() {
        let raw = r#"{
            "student_id":"S1",
            "department_id":"0191d6a8-1c2b-7000-8000-000000000001",
            "session_id":"0191d6a8-1c2b-7000-8000-000000000002"
        }"#;
        let req: SubmitApplicationRequest = serde_json::from_str(raw).unwrap();
        assert!(req.interested_areas.is_empty());
        assert!(req.learning_track_id.is_none());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&ApplicationStatus::Pending).unwrap(), "\"PENDING\"");
    }
}
