//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /api/auth/register` - Create an account, returns user + token
//! - `POST /api/auth/login` - Authenticate, returns user + token
//! - `POST /api/auth/forgot-password` - Always-200 reset stub

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shopadmin_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};

use super::MessageResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username
    #[validate(length(min = 3, max = 255, message = "Username must be 3-255 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Email address; accepted without any existence check
    pub email: String,
}

/// Response for register and login: the user plus an issued bearer token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user record (password hash is never serialized)
    pub user: User,

    /// Signed bearer token encoding the user id
    pub token: String,
}

/// Registers a new user
///
/// Fails with a conflict when the username or email is already taken; the
/// unique constraints on both columns back up the pre-checks against
/// concurrent registrations.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or duplicate username/email
/// - `500 Internal Server Error`: hashing or store failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    tracing::info!(user_id = user.id, "Registered new user");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// Authenticates a user and issues a bearer token
///
/// Unknown email and wrong password produce the same message, so the
/// response does not reveal which part failed.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or password mismatch
/// - `500 Internal Server Error`: store failure
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        tracing::debug!(user_id = user.id, "Login rejected: password mismatch");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse { user, token }))
}

/// Forgot-password stub
///
/// Accepts any email and always reports success. No reset email is sent
/// and no account existence is revealed; the endpoint exists so the client
/// can show its confirmation message.
pub async fn forgot_password(
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    tracing::info!(email = %req.email, "Password reset requested");

    Ok(Json(MessageResponse {
        message: "Password reset instructions have been sent".to_string(),
    }))
}
