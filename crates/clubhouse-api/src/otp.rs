//! Email verification by one-time code.
//!
//! A code lives under `otp:<email>` for the configured TTL, its failed
//! attempts under `otp:<email>:attempts`. A correct code is swapped for a
//! `verified:<email>` marker that registration consumes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use clubhouse_common::config::OtpConfig;
use clubhouse_common::error::{ClubError, ClubResult};
use clubhouse_common::validation::normalize_email;
use clubhouse_db::redis_pool;
use rand::Rng;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::mailer::Mailer;

const PREFIX: &str = "otp";
const VERIFIED_PREFIX: &str = "verified";

/// Expiring key-value storage for codes and counters.
pub trait OtpCache: Send + Sync {
    fn exists(&self, key: &str) -> impl Future<Output = ClubResult<bool>> + Send;

    fn get(&self, key: &str) -> impl Future<Output = ClubResult<Option<String>>> + Send;

    fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> impl Future<Output = ClubResult<()>> + Send;

    fn del(&self, keys: &[&str]) -> impl Future<Output = ClubResult<()>> + Send;

    /// Increment a counter and reset its TTL. Returns the new value.
    fn incr_ex(&self, key: &str, ttl_secs: u64) -> impl Future<Output = ClubResult<i64>> + Send;

    /// Read and delete.
    fn take(&self, key: &str) -> impl Future<Output = ClubResult<Option<String>>> + Send;
}

/// Redis-backed cache.
#[derive(Clone)]
pub struct RedisOtpCache {
    conn: ConnectionManager,
}

impl RedisOtpCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

impl OtpCache for RedisOtpCache {
    async fn exists(&self, key: &str) -> ClubResult<bool> {
        Ok(redis_pool::exists(&mut self.conn.clone(), key).await?)
    }

    async fn get(&self, key: &str) -> ClubResult<Option<String>> {
        Ok(redis_pool::get(&mut self.conn.clone(), key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> ClubResult<()> {
        Ok(redis_pool::set_ex(&mut self.conn.clone(), key, value, ttl_secs).await?)
    }

    async fn del(&self, keys: &[&str]) -> ClubResult<()> {
        Ok(redis_pool::del(&mut self.conn.clone(), keys).await?)
    }

    async fn incr_ex(&self, key: &str, ttl_secs: u64) -> ClubResult<i64> {
        Ok(redis_pool::incr_expire(&mut self.conn.clone(), key, ttl_secs).await?)
    }

    async fn take(&self, key: &str) -> ClubResult<Option<String>> {
        Ok(redis_pool::take(&mut self.conn.clone(), key).await?)
    }
}

/// Process-local cache with lazy expiry on `tokio::time`.
#[derive(Debug, Clone, Default)]
pub struct MemoryOtpCache {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryOtpCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn live(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl OtpCache for MemoryOtpCache {
    async fn exists(&self, key: &str) -> ClubResult<bool> {
        Ok(self.live(key).await.is_some())
    }

    async fn get(&self, key: &str) -> ClubResult<Option<String>> {
        Ok(self.live(key).await)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> ClubResult<()> {
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> ClubResult<()> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn incr_ex(&self, key: &str, ttl_secs: u64) -> ClubResult<i64> {
        let current = self
            .live(key)
            .await
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let next = current + 1;
        self.set_ex(key, &next.to_string(), ttl_secs).await?;
        Ok(next)
    }

    async fn take(&self, key: &str) -> ClubResult<Option<String>> {
        let value = self.live(key).await;
        self.entries.lock().await.remove(key);
        Ok(value)
    }
}

/// Issues and checks verification codes.
pub struct OtpService<C, M> {
    cache: C,
    mailer: M,
    config: OtpConfig,
}

fn code_key(email: &str) -> String {
    format!("{PREFIX}:{email}")
}

fn attempts_key(email: &str) -> String {
    format!("{PREFIX}:{email}:attempts")
}

fn verified_key(email: &str) -> String {
    format!("{VERIFIED_PREFIX}:{email}")
}

impl<C: OtpCache, M: Mailer> OtpService<C, M> {
    pub fn new(cache: C, mailer: M, config: OtpConfig) -> Self {
        Self { cache, mailer, config }
    }

    fn generate_code(&self) -> String {
        let length = self.config.length.clamp(4, 9);
        let low = 10u32.pow(length - 1);
        rand::rng().random_range(low..low * 10).to_string()
    }

    /// Send a fresh code. Callers check that no account owns `email` first.
    pub async fn send(&self, email: &str, name: &str) -> ClubResult<()> {
        let email = normalize_email(email);
        let key = code_key(&email);

        if self.cache.exists(&key).await? {
            return Err(ClubError::RateLimited {
                message: "OTP already sent. Please wait.".into(),
            });
        }

        let code = self.generate_code();
        self.cache.set_ex(&key, &code, self.config.ttl_secs).await?;
        self.cache.del(&[&attempts_key(&email)]).await?;
        self.mailer.send_otp(&email, name.trim(), &code).await?;

        tracing::info!(email = %email, "OTP issued");
        Ok(())
    }

    /// Check a code. On success the email is marked verified for registration.
    pub async fn verify(&self, email: &str, otp: &str) -> ClubResult<()> {
        let email = normalize_email(email);
        let key = code_key(&email);
        let attempts = attempts_key(&email);

        let saved = self.cache.get(&key).await?.ok_or(ClubError::OtpExpired)?;

        let failed = self
            .cache
            .get(&attempts)
            .await?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        if failed >= self.config.max_attempts {
            self.cache.del(&[&key, &attempts]).await?;
            return Err(ClubError::RateLimited {
                message: "Too many invalid attempts. OTP expired.".into(),
            });
        }

        if saved != otp.trim() {
            self.cache.incr_ex(&attempts, self.config.ttl_secs).await?;
            tracing::debug!(email = %email, attempts = failed + 1, "OTP mismatch");
            return Err(ClubError::InvalidOtp);
        }

        self.cache.del(&[&key, &attempts]).await?;
        self.cache
            .set_ex(&verified_key(&email), "1", self.config.verified_ttl_secs)
            .await?;
        tracing::info!(email = %email, "Email verified");
        Ok(())
    }

    /// Consume the verification marker. `false` if the email was never verified or the marker expired.
    pub async fn consume_verified(&self, email: &str) -> ClubResult<bool> {
        let email = normalize_email(email);
        Ok(self.cache.take(&verified_key(&email)).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Default)]
    struct RecordingMailer {
        sent: Arc<StdMutex<Vec<(String, String)>>>,
    }

    impl RecordingMailer {
        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().1.clone()
        }
    }

    impl Mailer for RecordingMailer {
        async fn send_otp(&self, to: &str, _name: &str, code: &str) -> ClubResult<()> {
            self.sent.lock().unwrap().push((to.to_string(), code.to_string()));
            Ok(())
        }
    }

    fn config() -> OtpConfig {
        OtpConfig {
            length: 6,
            ttl_secs: 300,
            max_attempts: 5,
            verified_ttl_secs: 900,
        }
    }

    fn service() -> (OtpService<MemoryOtpCache, RecordingMailer>, RecordingMailer) {
        let mailer = RecordingMailer::default();
        (OtpService::new(MemoryOtpCache::new(), mailer.clone(), config()), mailer)
    }

    fn wrong(code: &str) -> String {
        if code == "000000" { "111111".into() } else { "000000".into() }
    }

    #[tokio::test]
    async fn test_send_then_verify() {
        let (otp, mailer) = service();
        otp.send("  Ada@Example.com ", "Ada").await.unwrap();

        let code = mailer.last_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(mailer.sent.lock().unwrap()[0].0, "ada@example.com");

        otp.verify("ada@example.com", &format!(" {code} ")).await.unwrap();
        assert!(otp.consume_verified("ADA@example.com").await.unwrap());
        assert!(!otp.consume_verified("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_resend_while_live_is_rate_limited() {
        let (otp, _) = service();
        otp.send("a@example.com", "A").await.unwrap();
        assert!(matches!(
            otp.send("a@example.com", "A").await,
            Err(ClubError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn test_verify_without_code_is_expired() {
        let (otp, _) = service();
        assert!(matches!(
            otp.verify("nobody@example.com", "123456").await,
            Err(ClubError::OtpExpired)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_expires() {
        let (otp, mailer) = service();
        otp.send("a@example.com", "A").await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(matches!(
            otp.verify("a@example.com", &mailer.last_code()).await,
            Err(ClubError::OtpExpired)
        ));
        otp.send("a@example.com", "A").await.unwrap();
    }

    #[tokio::test]
    async fn test_attempts_are_capped() {
        let (otp, mailer) = service();
        otp.send("a@example.com", "A").await.unwrap();
        let code = mailer.last_code();

        for _ in 0..5 {
            assert!(matches!(
                otp.verify("a@example.com", &wrong(&code)).await,
                Err(ClubError::InvalidOtp)
            ));
        }
        assert!(matches!(
            otp.verify("a@example.com", &code).await,
            Err(ClubError::RateLimited { .. })
        ));
        // The code was burned with the counter.
        assert!(matches!(
            otp.verify("a@example.com", &code).await,
            Err(ClubError::OtpExpired)
        ));
        assert!(!otp.consume_verified("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_resend_resets_attempts() {
        let (otp, mailer) = service();
        otp.send("a@example.com", "A").await.unwrap();
        let first = mailer.last_code();
        for _ in 0..4 {
            let _ = otp.verify("a@example.com", &wrong(&first)).await;
        }
        otp.cache.del(&["otp:a@example.com"]).await.unwrap();

        otp.send("a@example.com", "A").await.unwrap();
        otp.verify("a@example.com", &wrong(&mailer.last_code())).await.unwrap_err();
        otp.verify("a@example.com", &mailer.last_code()).await.unwrap();
    }
}
