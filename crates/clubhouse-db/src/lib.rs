//! # clubhouse-db
//!
//! Database layer for Clubhouse. Manages connections to:
//! - **PostgreSQL**: users, role profiles, reference data, applications, notices
//! - **Redis**: short-lived OTP codes and verification markers

pub mod postgres;
pub mod redis_pool;
pub mod repository;
pub mod store;

pub use store::{PgStore, PgTx};

use anyhow::Result;
use sqlx::PgPool;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
    pub redis: redis::aio::ConnectionManager,
}

impl Database {
    /// Connect to PostgreSQL and Redis.
    pub async fn connect(config: &clubhouse_common::config::AppConfig) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");
        let pg = postgres::connect(&config.database).await?;
        tracing::info!("Connected to PostgreSQL");

        tracing::info!("Connecting to Redis...");
        let redis = redis_pool::connect(&config.redis.url).await?;
        tracing::info!("Connected to Redis");

        Ok(Self { pg, redis })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migrate(&self.pg).await
    }

    /// Lifecycle store over this pool.
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pg.clone())
    }
}

/// Apply the embedded migrations. Does not need Redis.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations complete");
    Ok(())
}
