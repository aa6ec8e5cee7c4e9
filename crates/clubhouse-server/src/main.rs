//! # Clubhouse Server
//!
//! Binary entry point. Subcommands:
//! - `serve` (default): connect to PostgreSQL and Redis, migrate, serve the REST API
//! - `migrate`: apply migrations and exit
//! - `seed-admin`: create the configured SUPER_ADMIN account if it does not exist

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clubhouse_api::{AppState, auth, build_router};
use clubhouse_common::config::AppConfig;
use clubhouse_common::models::{AdminLevel, NewAdminProfile, UserRole};
use clubhouse_common::snowflake;
use clubhouse_common::validation::normalize_email;
use clubhouse_db::Database;
use clubhouse_db::repository::{profiles, users};

#[derive(Debug, Parser)]
#[command(name = "clubhouse", version, about = "Programming club membership backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Create the super admin from `seed.super_admin_email` / `seed.super_admin_password`
    SeedAdmin,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = clubhouse_common::config::init()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let pool = clubhouse_db::postgres::connect(&config.database).await?;
            clubhouse_db::migrate(&pool).await
        }
        Command::SeedAdmin => {
            let pool = clubhouse_db::postgres::connect(&config.database).await?;
            seed_admin(&pool, config).await
        }
    }
}

async fn serve(config: &'static AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Clubhouse v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await?;
    db.migrate().await?;

    let router = build_router(AppState::new(db, config), config);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("REST API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Idempotent: an existing account with the seed email is left untouched.
async fn seed_admin(pool: &sqlx::PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let email = config
        .seed
        .super_admin_email
        .as_deref()
        .map(normalize_email)
        .context("seed.super_admin_email is not set")?;
    let password = config
        .seed
        .super_admin_password
        .as_deref()
        .context("seed.super_admin_password is not set")?;

    if users::email_exists(pool, &email).await? {
        tracing::info!(email = %email, "Super admin already exists, nothing to do");
        return Ok(());
    }

    let password_hash = auth::hash_password(password).map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut tx = pool.begin().await?;
    let user = users::create_user(
        &mut *tx,
        &users::NewUser {
            id: snowflake::generate_id(),
            first_name: "Super",
            last_name: "Admin",
            email: &email,
            password_hash: &password_hash,
            phone: None,
            role: UserRole::SuperAdmin,
            is_verified: true,
        },
    )
    .await?;
    profiles::insert_admin(
        &mut *tx,
        snowflake::generate_id(),
        user.id,
        &NewAdminProfile {
            admin_level: AdminLevel::Owner,
            profile_image: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, email = %email, "Super admin created");
    Ok(())
}
