//! In-process store.
//!
//! Transactions take an exclusive lock on the whole data set and work on a
//! private copy that replaces the shared state only on commit, so concurrent
//! transactions are serialised and an uncommitted one leaves no trace.
//! Used by the test suites; nothing here is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use clubhouse_common::models::{
    ApplicationFilter, ApplicationListItem, ApplicationSortField, ApplicationStatus, Member,
    MembershipApplication, User, UserRole,
};
use clubhouse_common::pagination::{PageWindow, SortOrder};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{
    ApplicationChange, ApplicationStore, MemberStore, NewApplication, NewMember, Store,
    StoreResult, StoreTx, UserStore,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    applications: HashMap<Uuid, MembershipApplication>,
    members: HashMap<Uuid, Member>,
}

#[derive(Debug, Default)]
struct Faults {
    fail_member_insert: AtomicBool,
}

/// Shared, cloneable handle to an in-memory data set.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user outside any transaction.
    pub async fn put_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.tables.lock().await.users.get(&id).cloned()
    }

    pub async fn application(&self, id: Uuid) -> Option<MembershipApplication> {
        self.tables.lock().await.applications.get(&id).cloned()
    }

    /// Every application row owned by `user_id`.
    pub async fn applications_of(&self, user_id: Uuid) -> Vec<MembershipApplication> {
        self.tables
            .lock()
            .await
            .applications
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every member row owned by `user_id`.
    pub async fn members_of(&self, user_id: Uuid) -> Vec<Member> {
        self.tables
            .lock()
            .await
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Make every member insert fail with a backend error until switched off.
    pub fn fail_member_inserts(&self, fail: bool) {
        self.faults.fail_member_insert.store(fail, Ordering::SeqCst);
    }
}

impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx {
            guard,
            working,
            faults: self.faults.clone(),
        })
    }
}

/// Open transaction on a [`MemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
    faults: Arc<Faults>,
}

impl StoreTx for MemoryTx {
    async fn commit(self) -> StoreResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }
}

impl UserStore for MemoryTx {
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn promote_user(
        &mut self,
        id: Uuid,
        role: UserRole,
        phone: Option<String>,
    ) -> StoreResult<Option<User>> {
        let Some(user) = self.working.users.get_mut(&id) else {
            return Ok(None);
        };
        user.role = role;
        if phone.is_some() {
            user.phone = phone;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

impl ApplicationStore for MemoryTx {
    async fn find_application(&mut self, id: Uuid) -> StoreResult<Option<MembershipApplication>> {
        Ok(self.working.applications.get(&id).cloned())
    }

    async fn find_application_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<MembershipApplication>> {
        Ok(self
            .working
            .applications
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn insert_application(&mut self, new: NewApplication) -> StoreResult<MembershipApplication> {
        if self.working.applications.values().any(|a| a.user_id == new.user_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "membership_applications_user_id_key".into(),
            });
        }
        let now = Utc::now();
        let f = new.fields;
        let application = MembershipApplication {
            id: new.id,
            user_id: new.user_id,
            student_id: f.student_id,
            department_id: f.department_id,
            session_id: f.session_id,
            learning_track_id: f.learning_track_id,
            phone_number: f.phone_number,
            profile_image: f.profile_image,
            motivation: f.motivation,
            interested_areas: f.interested_areas,
            status: ApplicationStatus::Pending,
            review_comment: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.working.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn update_application(
        &mut self,
        id: Uuid,
        change: ApplicationChange,
    ) -> StoreResult<MembershipApplication> {
        let application = self
            .working
            .applications
            .get_mut(&id)
            .ok_or_else(|| StoreError::backend(format!("application {id} vanished mid-transaction")))?;

        match change {
            ApplicationChange::Resubmit(f) => {
                application.student_id = f.student_id;
                application.department_id = f.department_id;
                application.session_id = f.session_id;
                application.learning_track_id = f.learning_track_id;
                application.phone_number = f.phone_number;
                application.profile_image = f.profile_image;
                application.motivation = f.motivation;
                application.interested_areas = f.interested_areas;
                application.status = ApplicationStatus::Pending;
                application.review_comment = None;
                application.reviewed_at = None;
            }
            ApplicationChange::Approve { reviewed_at } => {
                application.status = ApplicationStatus::Approved;
                application.reviewed_at = Some(reviewed_at);
            }
            ApplicationChange::Reject {
                review_comment,
                reviewed_at,
            } => {
                application.status = ApplicationStatus::Rejected;
                application.review_comment = Some(review_comment);
                application.reviewed_at = Some(reviewed_at);
            }
        }
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn list_applications(
        &mut self,
        filter: &ApplicationFilter,
        window: &PageWindow,
    ) -> StoreResult<Vec<ApplicationListItem>> {
        let mut rows = self.matching(filter);
        rows.sort_by(|a, b| {
            let (a, b) = (&a.application, &b.application);
            let ord = match filter.sort_by {
                ApplicationSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                ApplicationSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                ApplicationSortField::Status => {
                    status_rank(a.status).cmp(&status_rank(b.status))
                }
                ApplicationSortField::StudentId => a.student_id.cmp(&b.student_id),
            };
            let ord = ord.then_with(|| a.id.cmp(&b.id));
            match window.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        Ok(rows
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit as usize)
            .collect())
    }

    async fn count_applications(&mut self, filter: &ApplicationFilter) -> StoreResult<i64> {
        Ok(self.matching(filter).len() as i64)
    }
}

impl MemberStore for MemoryTx {
    async fn find_member_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<Member>> {
        Ok(self
            .working
            .members
            .values()
            .find(|m| m.user_id == user_id)
            .cloned())
    }

    async fn insert_member(&mut self, new: NewMember) -> StoreResult<Member> {
        if self.faults.fail_member_insert.load(Ordering::SeqCst) {
            return Err(StoreError::backend("injected member insert failure"));
        }
        if self.working.members.values().any(|m| m.user_id == new.user_id) {
            return Err(StoreError::UniqueViolation {
                constraint: "members_user_id_key".into(),
            });
        }
        let member = Member {
            id: new.id,
            user_id: new.user_id,
            student_id: new.student_id,
            department_id: new.department_id,
            session_id: new.session_id,
            learning_track_id: new.learning_track_id,
            profile_image: new.profile_image,
            joined_at: new.joined_at,
        };
        self.working.members.insert(member.id, member.clone());
        Ok(member)
    }
}

impl MemoryTx {
    /// Applications joined with their applicant that pass `filter`.
    fn matching(&self, filter: &ApplicationFilter) -> Vec<ApplicationListItem> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        self.working
            .applications
            .values()
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .filter(|a| filter.department_id.is_none_or(|d| a.department_id == d))
            .filter(|a| filter.session_id.is_none_or(|s| a.session_id == s))
            .filter(|a| {
                filter
                    .learning_track_id
                    .is_none_or(|t| a.learning_track_id == Some(t))
            })
            .filter_map(|a| {
                let user = self.working.users.get(&a.user_id)?;
                Some(ApplicationListItem {
                    application: a.clone(),
                    applicant_first_name: user.first_name.clone(),
                    applicant_last_name: user.last_name.clone(),
                    applicant_email: user.email.clone(),
                })
            })
            .filter(|row| match &needle {
                None => true,
                Some(n) => [
                    &row.application.student_id,
                    &row.applicant_first_name,
                    &row.applicant_last_name,
                    &row.applicant_email,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(n.as_str())),
            })
            .collect()
    }
}

/// Matches the declaration order of the Postgres enum.
fn status_rank(status: ApplicationStatus) -> u8 {
    match status {
        ApplicationStatus::Pending => 0,
        ApplicationStatus::Approved => 1,
        ApplicationStatus::Rejected => 2,
    }
}
