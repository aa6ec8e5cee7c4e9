//! Redis connection and the handful of commands the OTP cache needs.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Open a reconnecting connection.
pub async fn connect(url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(url)?;
    ConnectionManager::new(client).await
}

/// Set a key with expiration.
pub async fn set_ex(
    conn: &mut ConnectionManager,
    key: &str,
    value: &str,
    ttl_secs: u64,
) -> Result<(), redis::RedisError> {
    conn.set_ex(key, value, ttl_secs).await
}

/// Get a value by key.
pub async fn get(conn: &mut ConnectionManager, key: &str) -> Result<Option<String>, redis::RedisError> {
    conn.get(key).await
}

/// Delete one or more keys.
pub async fn del(conn: &mut ConnectionManager, keys: &[&str]) -> Result<(), redis::RedisError> {
    conn.del(keys).await
}

/// Check if a key exists.
pub async fn exists(conn: &mut ConnectionManager, key: &str) -> Result<bool, redis::RedisError> {
    conn.exists(key).await
}

/// Increment a counter and (re)arm its expiry.
pub async fn incr_expire(
    conn: &mut ConnectionManager,
    key: &str,
    ttl_secs: u64,
) -> Result<i64, redis::RedisError> {
    let (count,): (i64,) = redis::pipe()
        .atomic()
        .incr(key, 1)
        .expire(key, ttl_secs as i64)
        .ignore()
        .query_async(conn)
        .await?;
    Ok(count)
}

/// Read a key and delete it in one round trip.
pub async fn take(conn: &mut ConnectionManager, key: &str) -> Result<Option<String>, redis::RedisError> {
    let (value,): (Option<String>,) = redis::pipe()
        .atomic()
        .get(key)
        .del(key)
        .ignore()
        .query_async(conn)
        .await?;
    Ok(value)
}
