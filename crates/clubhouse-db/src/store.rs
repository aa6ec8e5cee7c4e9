//! PostgreSQL implementation of the lifecycle store contracts.
//!
//! Every call runs on one `sqlx` transaction. Application reads take a row
//! lock (`FOR UPDATE`), so two reviewers racing on the same application are
//! serialised and the second one sees the first one's status.

use clubhouse_common::models::{
    ApplicationFilter, ApplicationListItem, Member, MembershipApplication, User, UserRole,
};
use clubhouse_common::pagination::PageWindow;
use clubhouse_membership::{
    ApplicationChange, ApplicationStore, MemberStore, NewApplication, NewMember, Store,
    StoreError, StoreResult, StoreTx, UserStore,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::postgres::unique_violation;
use crate::repository::{applications, members, users};

/// Transaction factory over a pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> StoreResult<PgTx> {
        let tx = self.pool.begin().await.map_err(store_err)?;
        Ok(PgTx { tx })
    }
}

/// One open transaction. Dropped without commit, it rolls back.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

fn store_err(err: sqlx::Error) -> StoreError {
    match unique_violation(&err) {
        Some(constraint) => StoreError::UniqueViolation { constraint },
        None => StoreError::backend(err),
    }
}

fn vanished(id: Uuid) -> StoreError {
    StoreError::backend(format!("application {id} disappeared inside its transaction"))
}

impl StoreTx for PgTx {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(store_err)
    }
}

impl UserStore for PgTx {
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        users::find_by_id(&mut *self.tx, id).await.map_err(store_err)
    }

    async fn promote_user(
        &mut self,
        id: Uuid,
        role: UserRole,
        phone: Option<String>,
    ) -> StoreResult<Option<User>> {
        users::set_role(&mut *self.tx, id, role, phone.as_deref())
            .await
            .map_err(store_err)
    }
}

impl ApplicationStore for PgTx {
    async fn find_application(&mut self, id: Uuid) -> StoreResult<Option<MembershipApplication>> {
        applications::find_for_update(&mut *self.tx, id)
            .await
            .map_err(store_err)
    }

    async fn find_application_by_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Option<MembershipApplication>> {
        applications::find_by_user(&mut *self.tx, user_id)
            .await
            .map_err(store_err)
    }

    async fn insert_application(&mut self, new: NewApplication) -> StoreResult<MembershipApplication> {
        applications::insert(&mut *self.tx, &new).await.map_err(store_err)
    }

    async fn update_application(
        &mut self,
        id: Uuid,
        change: ApplicationChange,
    ) -> StoreResult<MembershipApplication> {
        let updated = match change {
            ApplicationChange::Resubmit(fields) => {
                applications::resubmit(&mut *self.tx, id, &fields).await
            }
            ApplicationChange::Approve { reviewed_at } => {
                applications::mark_approved(&mut *self.tx, id, reviewed_at).await
            }
            ApplicationChange::Reject {
                review_comment,
                reviewed_at,
            } => applications::mark_rejected(&mut *self.tx, id, &review_comment, reviewed_at).await,
        };
        updated.map_err(store_err)?.ok_or_else(|| vanished(id))
    }

    async fn list_applications(
        &mut self,
        filter: &ApplicationFilter,
        window: &PageWindow,
    ) -> StoreResult<Vec<ApplicationListItem>> {
        applications::list(&mut *self.tx, filter, window)
            .await
            .map_err(store_err)
    }

    async fn count_applications(&mut self, filter: &ApplicationFilter) -> StoreResult<i64> {
        applications::count(&mut *self.tx, filter).await.map_err(store_err)
    }
}

impl MemberStore for PgTx {
    async fn find_member_by_user(&mut self, user_id: Uuid) -> StoreResult<Option<Member>> {
        members::find_by_user(&mut *self.tx, user_id)
            .await
            .map_err(store_err)
    }

    async fn insert_member(&mut self, new: NewMember) -> StoreResult<Member> {
        members::insert_member(&mut *self.tx, &new).await.map_err(store_err)
    }
}
