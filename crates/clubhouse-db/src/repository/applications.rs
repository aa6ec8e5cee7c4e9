//! Membership application repository.
//!
//! Writes here are only ever issued by the lifecycle store inside a transaction.

use chrono::{DateTime, Utc};
use clubhouse_common::models::{ApplicationFilter, ApplicationListItem, MembershipApplication};
use clubhouse_common::pagination::{PageWindow, like_pattern};
use clubhouse_membership::{ApplicationFields, NewApplication};
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

/// Fetch an application and lock its row until the transaction ends.
pub async fn find_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<MembershipApplication>, sqlx::Error> {
    sqlx::query_as::<_, MembershipApplication>(
        "SELECT * FROM membership_applications WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// The user's application, locked like [`find_for_update`].
pub async fn find_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<MembershipApplication>, sqlx::Error> {
    sqlx::query_as::<_, MembershipApplication>(
        "SELECT * FROM membership_applications WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Insert a PENDING application. Trips `membership_applications_user_id_key`
/// if the user already has one.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewApplication,
) -> Result<MembershipApplication, sqlx::Error> {
    let f = &new.fields;
    sqlx::query_as::<_, MembershipApplication>(
        r#"
        INSERT INTO membership_applications (
            id, user_id, student_id, department_id, session_id, learning_track_id,
            phone_number, profile_image, motivation, interested_areas,
            status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'PENDING', NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(&f.student_id)
    .bind(f.department_id)
    .bind(f.session_id)
    .bind(f.learning_track_id)
    .bind(f.phone_number.as_deref())
    .bind(f.profile_image.as_deref())
    .bind(f.motivation.as_deref())
    .bind(&f.interested_areas)
    .fetch_one(executor)
    .await
}

/// Overwrite the applicant fields and put the row back in the queue.
pub async fn resubmit<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    f: &ApplicationFields,
) -> Result<Option<MembershipApplication>, sqlx::Error> {
    sqlx::query_as::<_, MembershipApplication>(
        r#"
        UPDATE membership_applications SET
            student_id = $2,
            department_id = $3,
            session_id = $4,
            learning_track_id = $5,
            phone_number = $6,
            profile_image = $7,
            motivation = $8,
            interested_areas = $9,
            status = 'PENDING',
            review_comment = NULL,
            reviewed_at = NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&f.student_id)
    .bind(f.department_id)
    .bind(f.session_id)
    .bind(f.learning_track_id)
    .bind(f.phone_number.as_deref())
    .bind(f.profile_image.as_deref())
    .bind(f.motivation.as_deref())
    .bind(&f.interested_areas)
    .fetch_optional(executor)
    .await
}

pub async fn mark_approved<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    reviewed_at: DateTime<Utc>,
) -> Result<Option<MembershipApplication>, sqlx::Error> {
    sqlx::query_as::<_, MembershipApplication>(
        r#"
        UPDATE membership_applications SET
            status = 'APPROVED',
            reviewed_at = $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(reviewed_at)
    .fetch_optional(executor)
    .await
}

pub async fn mark_rejected<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    review_comment: &str,
    reviewed_at: DateTime<Utc>,
) -> Result<Option<MembershipApplication>, sqlx::Error> {
    sqlx::query_as::<_, MembershipApplication>(
        r#"
        UPDATE membership_applications SET
            status = 'REJECTED',
            review_comment = $2,
            reviewed_at = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(review_comment)
    .bind(reviewed_at)
    .fetch_optional(executor)
    .await
}

const LIST_FROM: &str = " FROM membership_applications a JOIN users u ON u.id = a.user_id";

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ApplicationFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        query
            .push(" AND (u.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.student_id ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        query.push(" AND a.status = ").push_bind(status);
    }
    if let Some(department_id) = filter.department_id {
        query.push(" AND a.department_id = ").push_bind(department_id);
    }
    if let Some(session_id) = filter.session_id {
        query.push(" AND a.session_id = ").push_bind(session_id);
    }
    if let Some(track_id) = filter.learning_track_id {
        query.push(" AND a.learning_track_id = ").push_bind(track_id);
    }
}

/// Page of applications joined with their applicant.
pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: &ApplicationFilter,
    window: &PageWindow,
) -> Result<Vec<ApplicationListItem>, sqlx::Error> {
    let order = window.sort_order.as_sql();
    let mut query = QueryBuilder::new(
        "SELECT a.*, u.first_name AS applicant_first_name, \
         u.last_name AS applicant_last_name, u.email AS applicant_email",
    );
    query.push(LIST_FROM);
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY ")
        .push(filter.sort_by.column())
        .push(" ")
        .push(order)
        .push(", a.id ")
        .push(order)
        .push(" LIMIT ")
        .push_bind(i64::from(window.limit))
        .push(" OFFSET ")
        .push_bind(window.offset());
    query.build_query_as().fetch_all(executor).await
}

pub async fn count<'e>(executor: impl PgExecutor<'e>, filter: &ApplicationFilter) -> Result<i64, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT COUNT(*)");
    query.push(LIST_FROM);
    push_filter(&mut query, filter);
    query.build_query_scalar().fetch_one(executor).await
}
