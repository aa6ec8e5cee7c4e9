//! Lifecycle and storage errors.

use clubhouse_common::error::ClubError;

/// Failure reported by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write (one application / one member per user).
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Anything else the backend reports. The transaction is rolled back.
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Typed rejection from a lifecycle operation.
///
/// Only `Store` is an infrastructure fault; every other variant is a business
/// rule and retrying it repeats the same answer.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Your application is under review")]
    AlreadyPending,

    #[error("Your application is already approved")]
    AlreadyApproved,

    #[error("Application already reviewed")]
    AlreadyReviewed,

    #[error("User is already a member")]
    DuplicateMember,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MembershipError> for ClubError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Validation(message) => ClubError::Validation { message },
            MembershipError::NotFound(resource) => ClubError::NotFound {
                resource: resource.to_string(),
            },
            MembershipError::AlreadyPending
            | MembershipError::AlreadyApproved
            | MembershipError::AlreadyReviewed
            | MembershipError::DuplicateMember => ClubError::Conflict {
                message: err.to_string(),
            },
            MembershipError::Store(e) => ClubError::Internal(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhouse_common::error::ClubError;

    #[test]
    fn test_guard_violations_map_to_conflict() {
        for err in [
            MembershipError::AlreadyPending,
            MembershipError::AlreadyApproved,
            MembershipError::AlreadyReviewed,
            MembershipError::DuplicateMember,
        ] {
            let club: ClubError = err.into();
            assert_eq!(club.status_code().as_u16(), 409);
        }
    }

    #[test]
    fn test_store_failure_hides_details() {
        let club: ClubError =
            MembershipError::Store(StoreError::backend("connection reset by peer")).into();
        assert_eq!(club.status_code().as_u16(), 500);
        assert_eq!(club.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_found_names_resource() {
        let club: ClubError = MembershipError::NotFound("Application").into();
        assert_eq!(club.to_string(), "Application not found");
    }
}
