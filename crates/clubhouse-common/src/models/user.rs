//! User model: the identity layer.
//!
//! Everyone starts as a GUEST after verifying their email. Roles above that
//! are granted by approval (MEMBER) or by an admin (MENTOR, MODERATOR, ADMIN).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A club account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v7: time-sortable)
    pub id: Uuid,

    pub first_name: String,
    pub last_name: String,

    /// Unique, stored lower-cased
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Contact phone, copied from the membership application on approval
    pub phone: Option<String>,

    pub role: UserRole,

    /// Disabled accounts cannot log in
    pub is_active: bool,

    /// Email ownership confirmed through OTP
    pub is_verified: bool,

    /// Soft-deleted by an admin
    pub is_deleted: bool,

    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the account may sign in and act.
    pub fn can_act(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// The single role carried by each account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Guest,
    Member,
    Mentor,
    Moderator,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Whether a holder of `self` passes a guard that allows `required`.
    ///
    /// Roles are not ranked; the only implication is SUPER_ADMIN ⊇ ADMIN.
    pub fn satisfies(self, required: UserRole) -> bool {
        self == required || (self == UserRole::SuperAdmin && required == UserRole::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Guest => "GUEST",
            UserRole::Member => "MEMBER",
            UserRole::Mentor => "MENTOR",
            UserRole::Moderator => "MODERATOR",
            UserRole::Admin => "ADMIN",
            UserRole::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration request. The email must have passed OTP verification first.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// Safe user representation for API responses (no sensitive fields)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            role: u.role,
            is_active: u.is_active,
            is_verified: u.is_verified,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Update own profile. Role, email and flags are not self-service.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 64))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub last_name: Option<String>,

    #[validate(length(min = 6, max = 20, message = "Phone must be 6-20 characters"))]
    pub phone: Option<String>,
}

/// Admin user listing filters.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive match on first name, last name or email
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_satisfies_admin_only() {
        assert!(UserRole::SuperAdmin.satisfies(UserRole::Admin));
        assert!(UserRole::Admin.satisfies(UserRole::Admin));
        assert!(!UserRole::Admin.satisfies(UserRole::SuperAdmin));
        assert!(!UserRole::SuperAdmin.satisfies(UserRole::Guest));
        assert!(!UserRole::Member.satisfies(UserRole::Guest));
    }

    #[test]
    fn test_role_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
        let role: UserRole = serde_json::from_str("\"MODERATOR\"").unwrap();
        assert_eq!(role, UserRole::Moderator);
    }

    #[test]
    fn test_register_request_rejects_unknown_fields() {
        let raw = r#"{"first_name":"A","last_name":"B","email":"a@b.co","password":"password1","role":"ADMIN"}"#;
        assert!(serde_json::from_str::<RegisterRequest>(raw).is_err());
    }
}
