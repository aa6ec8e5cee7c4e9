//! Department repository.

use clubhouse_common::models::{Department, DepartmentSummary};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a department. Trips `departments_name_key` on a duplicate name.
pub async fn create_department(pool: &PgPool, id: Uuid, name: &str) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(
        r#"
        INSERT INTO departments (id, name, is_deleted, created_at)
        VALUES ($1, $2, FALSE, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_one(pool)
    .await
}

/// Live departments by name, with how many members and applications point at each.
pub async fn list_departments(pool: &PgPool) -> Result<Vec<DepartmentSummary>, sqlx::Error> {
    sqlx::query_as::<_, DepartmentSummary>(
        r#"
        SELECT d.id, d.name,
               (SELECT COUNT(*) FROM members m WHERE m.department_id = d.id) AS member_count,
               (SELECT COUNT(*) FROM membership_applications a WHERE a.department_id = d.id) AS application_count
        FROM departments d
        WHERE d.is_deleted = FALSE
        ORDER BY d.name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1 AND is_deleted = FALSE")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns `false` if there was no live department with that ID.
pub async fn soft_delete_department(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE departments SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
