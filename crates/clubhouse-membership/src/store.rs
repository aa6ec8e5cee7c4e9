//! Store contracts the lifecycle service is written against.
//!
//! A [`Store`] opens transactions; a [`StoreTx`] is the scoped handle every
//! read and write goes through. Dropping a transaction without calling
//! [`StoreTx::commit`] rolls it back.

use std::future::Future;

use chrono::{DateTime, Utc};
use clubhouse_common::models::{
    ApplicationFilter, ApplicationListItem, Member, MembershipApplication, User, UserRole,
};
use clubhouse_common::pagination::PageWindow;
use uuid::Uuid;

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields an applicant controls. Written on first submission and overwritten on resubmission.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationFields {
    pub student_id: String,
    pub department_id: Uuid,
    pub session_id: Uuid,
    pub learning_track_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub motivation: Option<String>,
    pub interested_areas: Vec<String>,
}

/// A first-time application. Always inserted as PENDING.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fields: ApplicationFields,
}

/// The only three ways an existing application row changes.
#[derive(Debug, Clone)]
pub enum ApplicationChange {
    /// Replace applicant fields, clear review data, back to PENDING.
    Resubmit(ApplicationFields),
    /// Status APPROVED, review timestamp set.
    Approve { reviewed_at: DateTime<Utc> },
    /// Status REJECTED with the reviewer's comment.
    Reject {
        review_comment: String,
        reviewed_at: DateTime<Utc>,
    },
}

/// Member profile copied from an approved application.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub student_id: String,
    pub department_id: Uuid,
    pub session_id: Uuid,
    pub learning_track_id: Option<Uuid>,
    pub profile_image: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Identity store: reads users and changes their role.
pub trait UserStore {
    fn find_user(&mut self, id: Uuid) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Set the user's role and, when given, their phone. `None` if the user does not exist.
    fn promote_user(
        &mut self,
        id: Uuid,
        role: UserRole,
        phone: Option<String>,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;
}

/// Application store.
pub trait ApplicationStore {
    /// Fetch by ID and hold the row for the rest of the transaction.
    fn find_application(
        &mut self,
        id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<MembershipApplication>>> + Send;

    fn find_application_by_user(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<MembershipApplication>>> + Send;

    /// Fails with [`StoreError::UniqueViolation`] if the user already has a row.
    fn insert_application(
        &mut self,
        new: NewApplication,
    ) -> impl Future<Output = StoreResult<MembershipApplication>> + Send;

    fn update_application(
        &mut self,
        id: Uuid,
        change: ApplicationChange,
    ) -> impl Future<Output = StoreResult<MembershipApplication>> + Send;

    fn list_applications(
        &mut self,
        filter: &ApplicationFilter,
        window: &PageWindow,
    ) -> impl Future<Output = StoreResult<Vec<ApplicationListItem>>> + Send;

    fn count_applications(
        &mut self,
        filter: &ApplicationFilter,
    ) -> impl Future<Output = StoreResult<i64>> + Send;
}

/// Member store.
pub trait MemberStore {
    fn find_member_by_user(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Member>>> + Send;

    /// Fails with [`StoreError::UniqueViolation`] if the user already is a member.
    fn insert_member(&mut self, new: NewMember) -> impl Future<Output = StoreResult<Member>> + Send;
}

/// One open transaction over all three stores.
pub trait StoreTx: UserStore + ApplicationStore + MemberStore + Send {
    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Transaction factory injected into the lifecycle service.
pub trait Store: Send + Sync {
    type Tx: StoreTx;

    fn begin(&self) -> impl Future<Output = StoreResult<Self::Tx>> + Send;
}
