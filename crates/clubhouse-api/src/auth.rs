//! Password hashing and token issuing.
//!
//! Token validation lives in `clubhouse_common::auth` so it can be shared;
//! only the API ever mints tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use clubhouse_common::auth::Claims;
use clubhouse_common::models::User;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::RngCore;
use serde::Serialize;

pub const ACCESS: &str = "access";
pub const REFRESH: &str = "refresh";

/// Token pair returned on login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Hash a password with Argon2id and a random 16-byte salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_token(
    user: &User,
    token_type: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Generate both access and refresh tokens for `user`'s current role.
pub fn generate_token_pair(
    user: &User,
    secret: &str,
    access_ttl: u64,
    refresh_ttl: u64,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: generate_token(user, ACCESS, secret, access_ttl)?,
        refresh_token: generate_token(user, REFRESH, secret, refresh_ttl)?,
        expires_in: access_ttl,
        token_type: "Bearer".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubhouse_common::auth::validate_token;
    use clubhouse_common::models::UserRole;
    use uuid::Uuid;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            password_hash: String::new(),
            phone: None,
            role: UserRole::Mentor,
            is_active: true,
            is_verified: true,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw-12345").unwrap(), hash_password("pw-12345").unwrap());
    }

    #[test]
    fn test_token_pair_carries_role_and_type() {
        let user = user();
        let pair = generate_token_pair(&user, "test-secret", 60, 600).unwrap();

        let access = validate_token(&pair.access_token, "test-secret").unwrap();
        assert_eq!(access.sub, user.id.to_string());
        assert_eq!(access.role, UserRole::Mentor);
        assert_eq!(access.token_type, ACCESS);

        let refresh = validate_token(&pair.refresh_token, "test-secret").unwrap();
        assert_eq!(refresh.token_type, REFRESH);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let pair = generate_token_pair(&user(), "test-secret", 60, 600).unwrap();
        assert!(validate_token(&pair.access_token, "other-secret").is_err());
    }
}
