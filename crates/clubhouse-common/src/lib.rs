//! # clubhouse-common
//!
//! Shared types, configuration, error handling, and utilities used across all Clubhouse crates.
//! This is the foundation layer: no business logic, just primitives and contracts.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod snowflake;
pub mod validation;
