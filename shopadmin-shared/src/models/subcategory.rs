//! SubCategory model and database operations
//!
//! A subcategory belongs to exactly one category. Reads join the parent
//! category's display name onto each row; deletes cascade from the parent
//! category through the store's foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// SubCategory record, enriched with its parent category's name on reads
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubCategory {
    /// Unique subcategory id
    pub id: i64,

    /// Subcategory name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Owning category id (required, enforced by foreign key)
    pub category_id: i64,

    /// Stored path of the subcategory image, if any
    pub image: Option<String>,

    /// Display name of the owning category (LEFT JOIN on reads)
    pub category_name: Option<String>,

    /// When the subcategory was created
    pub created_at: DateTime<Utc>,

    /// When the subcategory was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new subcategory
#[derive(Debug, Clone)]
pub struct CreateSubCategory {
    pub name: String,
    pub description: Option<String>,
    pub category_id: i64,
    pub image: Option<String>,
}

/// Input for updating an existing subcategory
///
/// Merge semantics: only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateSubCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub image: Option<String>,
}

impl SubCategory {
    /// Returns all subcategories, newest first, with parent category names
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let subcategories = sqlx::query_as::<_, SubCategory>(
            r#"
            SELECT sc.id, sc.name, sc.description, sc.category_id, sc.image,
                   c.name AS category_name, sc.created_at, sc.updated_at
            FROM subcategories sc
            LEFT JOIN categories c ON sc.category_id = c.id
            ORDER BY sc.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(subcategories)
    }

    /// Finds a subcategory by id, with its parent category name
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let subcategory = sqlx::query_as::<_, SubCategory>(
            r#"
            SELECT sc.id, sc.name, sc.description, sc.category_id, sc.image,
                   c.name AS category_name, sc.created_at, sc.updated_at
            FROM subcategories sc
            LEFT JOIN categories c ON sc.category_id = c.id
            WHERE sc.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subcategory)
    }

    /// Creates a new subcategory and returns its id
    ///
    /// # Errors
    ///
    /// Returns a foreign-key violation if `category_id` does not reference
    /// an existing category.
    pub async fn create(pool: &PgPool, data: CreateSubCategory) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO subcategories (name, description, category_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.category_id)
        .bind(data.image)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// Updates a subcategory, writing only the provided fields
    ///
    /// Returns whether a row was affected.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateSubCategory,
    ) -> Result<bool, sqlx::Error> {
        let mut query = String::from("UPDATE subcategories SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.category_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_id = ${}", bind_count));
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
        if let Some(category_id) = data.category_id {
            q = q.bind(category_id);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        let result = q.execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a subcategory by id
    ///
    /// Returns whether a row was affected. Products under the subcategory
    /// are removed by the store's cascade rule.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_subcategory_default_is_empty() {
        let update = UpdateSubCategory::default();
        assert!(update.name.is_none());
        assert!(update.description.is_none());
        assert!(update.category_id.is_none());
        assert!(update.image.is_none());
    }
}
