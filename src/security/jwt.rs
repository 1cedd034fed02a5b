/// JWT issuance and validation (HS256).
/// Keys are loaded once at startup and shared process-wide.
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Username at issuance time
    pub username: String,
}

lazy_static! {
    static ref JWT_KEYS: RwLock<Option<(EncodingKey, DecodingKey, i64)>> = RwLock::new(None);
}

/// Install the signing secret and access-token TTL (seconds).
/// Must be called during application startup before any JWT operations.
pub fn initialize_keys(secret: &str, access_token_ttl: i64) -> Result<()> {
    if secret.len() < 32 {
        return Err(anyhow!("JWT secret must be at least 32 bytes"));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut keys = JWT_KEYS
        .write()
        .map_err(|e| anyhow!("Failed to acquire write lock on JWT keys: {}", e))?;
    *keys = Some((encoding_key, decoding_key, access_token_ttl));

    Ok(())
}

fn get_keys() -> Result<(EncodingKey, DecodingKey, i64)> {
    let keys = JWT_KEYS
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT keys: {}", e))?;

    keys.clone()
        .ok_or_else(|| anyhow!("JWT keys not initialized. Call initialize_keys() during startup"))
}

/// Generate an access token for a user.
pub fn generate_token(user_id: Uuid, username: &str) -> Result<String> {
    let (encoding_key, _, ttl) = get_keys()?;

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl)).timestamp(),
        username: username.to_string(),
    };

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| anyhow!("Failed to generate token: {}", e))
}

/// Validate a token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let (_, decoding_key, _) = get_keys()?;

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| anyhow!("Token validation failed: {}", e))
}

/// Token TTL currently in effect, for `expires_in` response fields.
pub fn access_token_ttl() -> Result<i64> {
    get_keys().map(|(_, _, ttl)| ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        initialize_keys("0123456789abcdef0123456789abcdef", 3600).unwrap();
    }

    #[test]
    fn test_roundtrip() {
        init();
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, "alice").unwrap();
        let data = validate_token(&token).unwrap();
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.username, "alice");
        assert!(data.claims.exp > data.claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        init();
        let token = generate_token(Uuid::new_v4(), "alice").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('a') { 'b' } else { 'a' });
        assert!(validate_token(&tampered).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(initialize_keys("too-short", 3600).is_err());
    }
}
