//! Bearer token resolution
//!
//! [`authenticate`] turns an `Authorization` header into a [`CurrentUser`]:
//! it parses the `Bearer <token>` form, validates the token, and resolves
//! the subject to a live user row. The API server calls it from its
//! bearer-auth middleware layer and stores the result in the request
//! extensions.

use serde::Serialize;
use sqlx::PgPool;

use super::jwt;
use crate::models::user::User;

/// The authenticated user attached to a request
///
/// Carries only the identity fields handlers need; the password hash never
/// leaves the model layer.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    /// User id (the token's subject)
    pub id: i64,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Access denied. No token provided.")]
    MissingCredentials,

    /// Authorization header is not of the form `Bearer <token>`
    #[error("Access denied. Invalid token format.")]
    InvalidFormat,

    /// Token failed signature, expiry, or issuer validation
    #[error("Invalid token.")]
    InvalidToken(#[source] jwt::JwtError),

    /// Token subject does not resolve to an existing user
    #[error("Invalid token.")]
    UnknownUser,

    /// User lookup failed
    #[error("Database error: {0}")]
    Database(String),
}

/// Resolves an `Authorization` header value to the current user
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when the header is absent
/// - `AuthError::InvalidFormat` when it is not `Bearer <token>`
/// - `AuthError::InvalidToken` when the token fails validation
/// - `AuthError::UnknownUser` when the subject id has no user row
/// - `AuthError::Database` when the lookup itself fails
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    auth_header: Option<&str>,
) -> Result<CurrentUser, AuthError> {
    let header = auth_header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = jwt::validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    tracing::debug!(user_id = user.id, "resolved bearer token to user");

    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_current_user_from_user() {
        let user = User {
            id: 3,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let current: CurrentUser = user.into();
        assert_eq!(current.id, 3);
        assert_eq!(current.username, "admin");
    }

    #[test]
    fn test_auth_error_messages_do_not_leak_details() {
        assert_eq!(
            AuthError::UnknownUser.to_string(),
            AuthError::InvalidToken(jwt::JwtError::Expired).to_string()
        );
    }
}
