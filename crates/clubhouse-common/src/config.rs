//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call clubhouse_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = defaults()?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (CLUBHOUSE__SERVER__PORT, CLUBHOUSE__DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("CLUBHOUSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Builder pre-loaded with every default value.
///
/// `database.url` and `auth.jwt_secret` have no default and must come from
/// the environment or `config.toml`.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("server.cors_origin", "*")?
        .set_default("database.max_connections", 20)?
        .set_default("database.min_connections", 2)?
        .set_default("redis.url", "redis://127.0.0.1:6379")?
        .set_default("auth.access_token_ttl_secs", 86_400)? // 1 day
        .set_default("auth.refresh_token_ttl_secs", 2_592_000)? // 30 days
        .set_default("otp.length", 6)?
        .set_default("otp.ttl_secs", 300)? // 5 min
        .set_default("otp.max_attempts", 5)?
        .set_default("otp.verified_ttl_secs", 900)?
        .set_default("mail.from", "Future Programmer Innovators Club <no-reply@fpic.club>")?
        .set_default("limits.default_page_size", 10)?
        .set_default("limits.max_page_size", 100)?
        .set_default("limits.max_motivation_length", 2000)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub otp: OtpConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin, `*` for any.
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// Redis connection URL. Only OTP codes live here.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256): should be 256+ bits of entropy
    pub jwt_secret: String,
    /// Access token TTL in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token TTL in seconds
    pub refresh_token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpConfig {
    /// Number of digits in a code
    pub length: u32,
    pub ttl_secs: u64,
    pub max_attempts: u32,
    /// How long a verified email stays eligible for registration
    pub verified_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub from: String,
}

/// Super admin account created by `clubhouse seed-admin`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub super_admin_email: Option<String>,
    pub super_admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_motivation_length: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_with_required_keys() {
        let cfg: AppConfig = defaults()
            .unwrap()
            .set_override("database.url", "postgres://localhost/clubhouse")
            .unwrap()
            .set_override("auth.jwt_secret", "secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.otp.length, 6);
        assert_eq!(cfg.otp.ttl_secs, 300);
        assert_eq!(cfg.otp.max_attempts, 5);
        assert_eq!(cfg.limits.default_page_size, 10);
        assert!(cfg.seed.super_admin_email.is_none());
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        let result = defaults()
            .unwrap()
            .set_override("database.url", "postgres://localhost/clubhouse")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();

        assert!(result.is_err());
    }
}
