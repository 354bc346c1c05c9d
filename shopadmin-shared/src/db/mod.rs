//! Database infrastructure
//!
//! - [`pool`]: PostgreSQL connection pool creation and health checks
//! - [`migrations`]: embedded sqlx migration runner

pub mod migrations;
pub mod pool;
