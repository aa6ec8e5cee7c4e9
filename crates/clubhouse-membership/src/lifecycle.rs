//! Membership lifecycle service.

use chrono::Utc;
use clubhouse_common::models::{
    ApplicationFilter, ApplicationListItem, ApplicationStatus, MembershipApplication,
    SubmitApplicationRequest, UserRole,
};
use clubhouse_common::pagination::{PageWindow, Paginated};
use clubhouse_common::snowflake;
use uuid::Uuid;

use crate::error::{MembershipError, StoreError};
use crate::store::{
    ApplicationChange, ApplicationFields, ApplicationStore, MemberStore, NewApplication, NewMember,
    Store, StoreTx, UserStore,
};

type Result<T> = std::result::Result<T, MembershipError>;

/// Owns the application state machine. Generic over the store it writes to.
#[derive(Clone)]
pub struct MembershipService<S> {
    store: S,
}

impl<S: Store> MembershipService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Submit a first application, or resubmit a rejected one in place.
    pub async fn submit_application(
        &self,
        user_id: Uuid,
        request: SubmitApplicationRequest,
    ) -> Result<MembershipApplication> {
        let fields = applicant_fields(request)?;
        let mut tx = self.store.begin().await?;

        let user = tx.find_user(user_id).await?.ok_or(MembershipError::NotFound("User"))?;
        if !user.can_act() {
            return Err(MembershipError::NotFound("User"));
        }
        if !user.is_verified {
            return Err(MembershipError::Validation(
                "Verify your email before applying".into(),
            ));
        }

        let existing = tx.find_application_by_user(user_id).await?;
        if let Some(application) = &existing {
            match application.status {
                ApplicationStatus::Pending => return Err(MembershipError::AlreadyPending),
                ApplicationStatus::Approved => return Err(MembershipError::AlreadyApproved),
                ApplicationStatus::Rejected => {}
            }
        }

        if user.role != UserRole::Guest {
            return Err(MembershipError::Validation(
                "Only guests can apply for membership".into(),
            ));
        }

        let application = match existing {
            Some(rejected) => {
                let updated = tx
                    .update_application(rejected.id, ApplicationChange::Resubmit(fields))
                    .await?;
                tracing::info!(application_id = %updated.id, user_id = %user_id, "Membership application resubmitted");
                updated
            }
            None => {
                let created = tx
                    .insert_application(NewApplication {
                        id: snowflake::generate_id(),
                        user_id,
                        fields,
                    })
                    .await
                    .map_err(|e| match e {
                        // Lost a race against a concurrent first submission.
                        StoreError::UniqueViolation { .. } => MembershipError::AlreadyPending,
                        other => other.into(),
                    })?;
                tracing::info!(application_id = %created.id, user_id = %user_id, "Membership application submitted");
                created
            }
        };

        tx.commit().await?;
        Ok(application)
    }

    /// The caller's own application, whatever its state.
    pub async fn my_application(&self, user_id: Uuid) -> Result<MembershipApplication> {
        let mut tx = self.store.begin().await?;
        let application = tx
            .find_application_by_user(user_id)
            .await?
            .ok_or(MembershipError::NotFound("Application"))?;
        tx.commit().await?;
        Ok(application)
    }

    /// Search, filter and paginate applications for the admin board.
    pub async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        window: &PageWindow,
    ) -> Result<Paginated<ApplicationListItem>> {
        let mut tx = self.store.begin().await?;
        let data = tx.list_applications(filter, window).await?;
        let total = tx.count_applications(filter).await?;
        tx.commit().await?;
        Ok(Paginated::new(window, total, data))
    }

    /// Approve a pending application.
    ///
    /// Promotes the user to MEMBER, creates their member profile and marks the
    /// application APPROVED in one transaction. Any failure leaves all three
    /// untouched.
    pub async fn approve_application(&self, application_id: Uuid) -> Result<MembershipApplication> {
        let mut tx = self.store.begin().await?;

        let application = tx
            .find_application(application_id)
            .await?
            .ok_or(MembershipError::NotFound("Application"))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MembershipError::AlreadyReviewed);
        }
        if tx.find_member_by_user(application.user_id).await?.is_some() {
            return Err(MembershipError::DuplicateMember);
        }

        tx.promote_user(
            application.user_id,
            UserRole::Member,
            application.phone_number.clone(),
        )
        .await?
        .ok_or(MembershipError::NotFound("User"))?;

        let now = Utc::now();
        tx.insert_member(NewMember {
            id: snowflake::generate_id(),
            user_id: application.user_id,
            student_id: application.student_id.clone(),
            department_id: application.department_id,
            session_id: application.session_id,
            learning_track_id: application.learning_track_id,
            profile_image: application.profile_image.clone(),
            joined_at: now,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => MembershipError::DuplicateMember,
            other => other.into(),
        })?;

        let approved = tx
            .update_application(application_id, ApplicationChange::Approve { reviewed_at: now })
            .await?;
        tx.commit().await?;

        tracing::info!(
            application_id = %approved.id,
            user_id = %approved.user_id,
            "Membership application approved"
        );
        Ok(approved)
    }

    /// Reject a pending application. A non-blank review comment is mandatory.
    pub async fn reject_application(
        &self,
        application_id: Uuid,
        review_comment: &str,
    ) -> Result<MembershipApplication> {
        let review_comment = review_comment.trim();
        if review_comment.is_empty() {
            return Err(MembershipError::Validation("Review comment is required".into()));
        }

        let mut tx = self.store.begin().await?;
        let application = tx
            .find_application(application_id)
            .await?
            .ok_or(MembershipError::NotFound("Application"))?;
        if application.status != ApplicationStatus::Pending {
            return Err(MembershipError::AlreadyReviewed);
        }

        let rejected = tx
            .update_application(
                application_id,
                ApplicationChange::Reject {
                    review_comment: review_comment.to_string(),
                    reviewed_at: Utc::now(),
                },
            )
            .await?;
        tx.commit().await?;

        tracing::info!(application_id = %rejected.id, "Membership application rejected");
        Ok(rejected)
    }
}

/// Normalise the applicant-controlled part of a submission.
fn applicant_fields(request: SubmitApplicationRequest) -> Result<ApplicationFields> {
    let student_id = request.student_id.trim().to_string();
    if student_id.is_empty() {
        return Err(MembershipError::Validation("Student ID is required".into()));
    }
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(ApplicationFields {
        student_id,
        department_id: request.department_id,
        session_id: request.session_id,
        learning_track_id: request.learning_track_id,
        phone_number: non_blank(request.phone_number),
        profile_image: non_blank(request.profile_image),
        motivation: non_blank(request.motivation),
        interested_areas: request
            .interested_areas
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
    })
}
