//! Category model and database operations
//!
//! Categories are the top level of the catalog. Names are unique; deleting
//! a category cascades (in the store) to its subcategories and their
//! products.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE categories (
//!     id BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(255) NOT NULL UNIQUE,
//!     description TEXT,
//!     image VARCHAR(512),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Category record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category id
    pub id: i64,

    /// Category name, unique across all categories
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Stored path of the category image (e.g. "/uploads/<name>"), if any
    pub image: Option<String>,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new category
#[derive(Debug, Clone, Default)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Input for updating an existing category
///
/// Merge semantics: only `Some` fields are written; absent fields keep
/// their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Category {
    /// Returns all categories, newest first
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Finds a category by id, returning `None` when no row matches
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by its unique name
    ///
    /// Used by the handlers for pre-insert uniqueness checks; the unique
    /// constraint on `name` remains the backstop against races.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(category)
    }

    /// Creates a new category and returns its id
    pub async fn create(pool: &PgPool, data: CreateCategory) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO categories (name, description, image)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Updates a category, writing only the provided fields
    ///
    /// Returns whether a row was affected. `updated_at` is always bumped.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateCategory,
    ) -> Result<bool, sqlx::Error> {
        let mut query = String::from("UPDATE categories SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a category by id
    ///
    /// Returns whether a row was affected. The store's foreign keys cascade
    /// the delete to subcategories and products.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
