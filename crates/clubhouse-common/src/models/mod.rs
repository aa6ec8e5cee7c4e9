//! Core domain models shared across all Clubhouse services.
//!
//! These are the "truth" types: what the database stores and the API serializes.
//! Every record is keyed by a UUID v7 (see [`crate::snowflake`]).

pub mod application;
pub mod department;
pub mod learning_track;
pub mod member;
pub mod notice;
pub mod profile;
pub mod session;
pub mod user;

/// Re-export all model types for convenience.
pub use application::*;
pub use department::*;
pub use learning_track::*;
pub use member::*;
pub use notice::*;
pub use profile::*;
pub use session::*;
pub use user::*;
