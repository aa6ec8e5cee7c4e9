//! API route modules.

pub mod auth;
pub mod departments;
pub mod health;
pub mod learning_tracks;
pub mod members;
pub mod notices;
pub mod otp;
pub mod sessions;
pub mod users;

use clubhouse_common::error::ClubError;
use clubhouse_common::pagination::{PageOptions, PageWindow, SortOrder};
use clubhouse_db::postgres::unique_violation;

/// Resolve client paging options against the configured limits.
pub(crate) fn page_window(page: Option<u32>, limit: Option<u32>, sort_order: Option<SortOrder>) -> PageWindow {
    let limits = &clubhouse_common::config::get().limits;
    PageWindow::resolve(
        &PageOptions { page, limit, sort_order },
        limits.default_page_size,
        limits.max_page_size,
    )
}

/// Map a failed insert or update: unique index → `AlreadyExists`, foreign key → `Validation`.
pub(crate) fn write_error(resource: &'static str) -> impl Fn(sqlx::Error) -> ClubError {
    move |err| {
        if unique_violation(&err).is_some() {
            return ClubError::AlreadyExists {
                resource: resource.to_string(),
            };
        }
        let dangling = matches!(&err, sqlx::Error::Database(db) if db.is_foreign_key_violation());
        if dangling {
            return ClubError::validation(
                "Referenced department, session or learning track does not exist",
            );
        }
        ClubError::Database(err)
    }
}
