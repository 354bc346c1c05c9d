//! Database models
//!
//! One module per entity, each exposing the model struct, its input structs,
//! and parameterized CRUD operations against the connection pool.
//!
//! # Models
//!
//! - `user`: administrator accounts used for authentication
//! - `category`: top-level catalog grouping
//! - `subcategory`: second-level grouping, belongs to one category
//! - `product`: sellable item, belongs to one category and one subcategory

pub mod category;
pub mod product;
pub mod subcategory;
pub mod user;
