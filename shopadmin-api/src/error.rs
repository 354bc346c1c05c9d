//! Error handling for the API server
//!
//! A unified error type that maps to HTTP responses. Handlers return
//! `Result<T, ApiError>`, which converts to the status codes of the error
//! taxonomy: validation and conflicts are 400, authentication failures are
//! 401, unknown ids are 404, and everything else is 500.
//!
//! Internal errors carry the underlying error string in the response body.
//! This surface is an internal admin tool; the raw detail is deliberate and
//! would not be acceptable on a public API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use shopadmin_shared::auth::{jwt::JwtError, middleware::AuthError, password::PasswordError};

use crate::uploads::UploadError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request field (400)
    BadRequest(String),

    /// Missing, malformed, or unresolvable credentials (401)
    Unauthorized(String),

    /// Referenced id does not resolve (404)
    NotFound(String),

    /// Duplicate unique field (400, kept as a distinct variant)
    Conflict(String),

    /// Request DTO validation failure (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unexpected failure (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Raw error detail for internal errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, detail, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None, None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg, None, None)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None, None),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg, None, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                None,
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Server error".to_string(),
                    Some(msg),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            detail,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique violations surface as conflicts and foreign-key or check
/// violations as bad requests; these constraints back up the handlers'
/// explicit pre-checks against races.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            // PostgreSQL SQLSTATE codes: 23505 unique, 23503 foreign key,
            // 23514 check constraint
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unique field");
                    ApiError::Conflict(format!("Duplicate value for {}", constraint))
                }
                Some("23503") => {
                    ApiError::BadRequest("Referenced row does not exist".to_string())
                }
                Some("23514") => {
                    ApiError::BadRequest("Value violates a data constraint".to_string())
                }
                _ => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert request authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(msg) => ApiError::InternalError(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Convert token errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert upload errors to API errors
impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge | UploadError::UnsupportedType => {
                ApiError::BadRequest(err.to_string())
            }
            UploadError::Io(e) => ApiError::InternalError(format!("Failed to store file: {}", e)),
        }
    }
}

/// Convert multipart parse errors to API errors
impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid multipart request: {}", err))
    }
}

/// Convert DTO validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Category not found".to_string());
        assert_eq!(err.to_string(), "Not found: Category not found");
    }

    #[test]
    fn test_conflict_maps_to_400() {
        let response = ApiError::Conflict("Category already exists".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upload_errors_map_to_400() {
        let err: ApiError = UploadError::UnsupportedType.into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = UploadError::TooLarge.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        let err: ApiError = AuthError::MissingCredentials.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let err: ApiError = AuthError::UnknownUser.into();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
