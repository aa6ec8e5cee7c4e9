//! Academic departments members and applicants belong to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Department as listed publicly, with usage counts.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DepartmentSummary {
    pub id: Uuid,
    pub name: String,
    pub member_count: i64,
    pub application_count: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 100, message = "Department name must be 1-100 characters"))]
    pub name: String,
}
