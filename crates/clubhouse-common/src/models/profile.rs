//! Role profiles: the per-role record that hangs off a user.
//!
//! Which profile table a user owns is decided by their role. Instead of
//! switching on role strings, the profile is a tagged enum and callers match
//! on it exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::member::Member;
use super::user::{User, UserRole, UserResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "admin_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminLevel {
    Owner,
    Manager,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdminProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_level: AdminLevel,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MentorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expertise: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ModeratorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Free-form description of what this moderator looks after
    pub scope: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's role-specific profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "profile", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleProfile {
    Admin(AdminProfile),
    Member(Member),
    Mentor(MentorProfile),
    Moderator(ModeratorProfile),
}

/// Which profile table a role owns, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Admin,
    Member,
    Mentor,
    Moderator,
}

impl ProfileKind {
    /// GUEST owns no profile. SUPER_ADMIN shares the admin table.
    pub fn for_role(role: UserRole) -> Option<Self> {
        match role {
            UserRole::Guest => None,
            UserRole::Member => Some(ProfileKind::Member),
            UserRole::Mentor => Some(ProfileKind::Mentor),
            UserRole::Moderator => Some(ProfileKind::Moderator),
            UserRole::Admin | UserRole::SuperAdmin => Some(ProfileKind::Admin),
        }
    }
}

/// `GET /users/me` response: the account plus its role profile.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub profile: Option<RoleProfile>,
}

impl MeResponse {
    pub fn new(user: User, profile: Option<RoleProfile>) -> Self {
        Self {
            user: user.into(),
            profile,
        }
    }
}

/// Account fields shared by every admin-created user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 6, max = 20, message = "Phone must be 6-20 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAdminProfile {
    pub admin_level: AdminLevel,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMentorProfile {
    pub expertise: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewModeratorProfile {
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewMemberProfile {
    pub student_id: String,
    pub department_id: Uuid,
    pub session_id: Uuid,
    pub learning_track_id: Option<Uuid>,
    pub profile_image: Option<String>,
}

/// Typed profile payload, tagged by the role being granted.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "role", content = "profile", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewRoleProfile {
    Admin(NewAdminProfile),
    Member(NewMemberProfile),
    Mentor(NewMentorProfile),
    Moderator(NewModeratorProfile),
}

impl NewRoleProfile {
    pub fn role(&self) -> UserRole {
        match self {
            NewRoleProfile::Admin(_) => UserRole::Admin,
            NewRoleProfile::Member(_) => UserRole::Member,
            NewRoleProfile::Mentor(_) => UserRole::Mentor,
            NewRoleProfile::Moderator(_) => UserRole::Moderator,
        }
    }
}

/// `POST /users/role-user` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleUserRequest {
    pub account: NewAccount,
    #[serde(flatten)]
    pub profile: NewRoleProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_kind_covers_every_role() {
        assert_eq!(ProfileKind::for_role(UserRole::Guest), None);
        assert_eq!(ProfileKind::for_role(UserRole::SuperAdmin), Some(ProfileKind::Admin));
        assert_eq!(ProfileKind::for_role(UserRole::Member), Some(ProfileKind::Member));
        assert_eq!(ProfileKind::for_role(UserRole::Mentor), Some(ProfileKind::Mentor));
        assert_eq!(ProfileKind::for_role(UserRole::Moderator), Some(ProfileKind::Moderator));
    }

    #[test]
    fn test_create_role_user_parses_tagged_profile() {
        let raw = r#"{
            "account": {
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "password": "engine-analytical"
            },
            "role": "MENTOR",
            "profile": { "expertise": "Rust", "bio": null, "profile_image": null }
        }"#;
        let req: CreateRoleUserRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.profile.role(), UserRole::Mentor);
        match req.profile {
            NewRoleProfile::Mentor(m) => assert_eq!(m.expertise.as_deref(), Some("Rust")),
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn test_create_role_user_rejects_unknown_role() {
        let raw = r#"{
            "account": {
                "first_name": "A", "last_name": "B",
                "email": "a@example.com", "password": "password123"
            },
            "role": "SUPER_ADMIN",
            "profile": {}
        }"#;
        assert!(serde_json::from_str::<CreateRoleUserRequest>(raw).is_err());
    }
}
