//! API route handlers
//!
//! One module per resource:
//!
//! - `health`: health check endpoint
//! - `auth`: register, login, forgot-password
//! - `categories`, `subcategories`, `products`: CRUD surfaces

pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod subcategories;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// Simple message body, used for delete confirmations and the
/// forgot-password stub
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Treats empty or whitespace-only form values as absent
///
/// HTML forms submit unfilled inputs as empty strings; those must not
/// overwrite stored values under merge-update semantics.
fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parses a form field value, mapping failures to a 400 naming the field
fn parse_field<T: FromStr>(name: &str, value: &str) -> ApiResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_values() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }

    #[test]
    fn test_parse_field_reports_field_name() {
        let parsed: ApiResult<i64> = parse_field("category_id", "7");
        assert_eq!(parsed.unwrap(), 7);

        let failed: ApiResult<i64> = parse_field("category_id", "seven");
        let err = failed.unwrap_err();
        assert!(err.to_string().contains("category_id"));
    }
}
