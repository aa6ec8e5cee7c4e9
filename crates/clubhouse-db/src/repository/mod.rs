//! Repository layer: query functions organized by domain.
//!
//! Functions that also run inside a lifecycle transaction take any
//! [`sqlx::PgExecutor`]; the rest take the pool.

pub mod applications;
pub mod departments;
pub mod learning_tracks;
pub mod members;
pub mod notices;
pub mod profiles;
pub mod sessions;
pub mod users;
