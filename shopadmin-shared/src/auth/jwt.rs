//! Bearer token generation and validation
//!
//! Tokens are JWTs signed with HS256 and carry the user id as the subject.
//! A login issues one token; mutating requests present it back as
//! `Authorization: Bearer <token>`.
//!
//! # Example
//!
//! ```
//! use shopadmin_shared::auth::jwt::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let claims = Claims::new(42);
//! let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
//!
//! let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
//! assert_eq!(validated.sub, 42);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim embedded in every token
pub const ISSUER: &str = "shopadmin";

/// Default token lifetime
const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Issuer claim does not match
    #[error("Invalid token issuer")]
    InvalidIssuer,
}

/// Token claims
///
/// Standard claims only: `sub` carries the user id, `iss` is fixed to
/// [`ISSUER`], and `iat`/`exp`/`nbf` bound the token's validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24h expiration
    pub fn new(user_id: i64) -> Self {
        Self::with_expiration(user_id, Duration::hours(DEFAULT_EXPIRATION_HOURS))
    }

    /// Creates claims with a custom expiration window
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks whether the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiration, not-before window, and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` when the token is past its `exp`
/// - `JwtError::InvalidIssuer` when the issuer claim is wrong
/// - `JwtError::ValidationError` for any other failure (bad signature,
///   malformed token, tampered payload)
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_roundtrip() {
        let claims = Claims::new(7);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, 7);
        assert_eq!(validated.iss, ISSUER);
        assert!(!validated.is_expired());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = Claims::new(7);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "a-completely-different-32-byte-key!!");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s validation leeway
        let claims = Claims::with_expiration(7, Duration::hours(-2));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
        assert!(claims.is_expired());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let mut claims = Claims::new(7);
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let claims = Claims::new(7);
        let token = create_token(&claims, SECRET).unwrap();
        let tampered = format!("{}x", token);

        assert!(validate_token(&tampered, SECRET).is_err());
    }
}
