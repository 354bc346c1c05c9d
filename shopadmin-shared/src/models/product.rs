//! Product model and database operations
//!
//! Products belong to one category and one subcategory. Reads join the
//! parent display names and aggregate the ordered image paths from the
//! `product_images` table; writes that touch both the product row and its
//! image rows run inside a single transaction so a failure rolls back the
//! whole operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.category_id, p.subcategory_id,
           p.stock, p.sku, p.created_at, p.updated_at,
           c.name AS category_name,
           sc.name AS subcategory_name,
           COALESCE(
               array_remove(array_agg(pi.path ORDER BY pi.position), NULL),
               '{}'
           )::text[] AS images
    FROM products p
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN subcategories sc ON p.subcategory_id = sc.id
    LEFT JOIN product_images pi ON pi.product_id = p.id
"#;

/// Product record, enriched with parent display names and image paths
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product id
    pub id: i64,

    /// Product name
    pub name: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Unit price, always positive
    pub price: Decimal,

    /// Owning category id
    pub category_id: i64,

    /// Owning subcategory id
    pub subcategory_id: i64,

    /// Units in stock, never negative
    pub stock: i32,

    /// Optional stock-keeping unit, unique when present
    pub sku: Option<String>,

    /// Ordered stored paths of the product images
    pub images: Vec<String>,

    /// Display name of the owning category (LEFT JOIN on reads)
    pub category_name: Option<String>,

    /// Display name of the owning subcategory (LEFT JOIN on reads)
    pub subcategory_name: Option<String>,

    /// When the product was created
    pub created_at: DateTime<Utc>,

    /// When the product was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new product
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i64,
    pub subcategory_id: i64,
    pub stock: i32,
    pub sku: Option<String>,
    /// Stored image paths, in display order
    pub images: Vec<String>,
}

/// Input for updating an existing product
///
/// Merge semantics: only `Some` fields are written. A provided `images`
/// list replaces the stored image records wholesale.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub images: Option<Vec<String>>,
}

impl Product {
    /// Returns all products, newest first, with joined display names and
    /// aggregated image paths
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "{SELECT_PRODUCT} GROUP BY p.id, c.name, sc.name ORDER BY p.created_at DESC"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(pool)
            .await?;

        Ok(products)
    }

    /// Finds a product by id, with joined display names and image paths
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("{SELECT_PRODUCT} WHERE p.id = $1 GROUP BY p.id, c.name, sc.name");

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(product)
    }

    /// Creates a new product and its image records in one transaction
    ///
    /// Returns the new product id. If any image insert fails, the product
    /// row is rolled back with it.
    ///
    /// # Errors
    ///
    /// Returns a foreign-key violation if `category_id` or `subcategory_id`
    /// does not reference an existing row, and a unique violation for a
    /// duplicate `sku`.
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO products (name, description, price, category_id, subcategory_id, stock, sku)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.category_id)
        .bind(data.subcategory_id)
        .bind(data.stock)
        .bind(data.sku)
        .fetch_one(&mut *tx)
        .await?;

        insert_images(&mut tx, id, &data.images).await?;

        tx.commit().await?;

        Ok(id)
    }

    /// Updates a product, writing only the provided fields
    ///
    /// Returns whether a row was affected. When `images` is provided the
    /// stored image records are replaced in the same transaction as the
    /// row update.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateProduct,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE products SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.category_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category_id = ${}", bind_count));
        }
        if data.subcategory_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", subcategory_id = ${}", bind_count));
        }
        if data.stock.is_some() {
            bind_count += 1;
            query.push_str(&format!(", stock = ${}", bind_count));
        }
        if data.sku.is_some() {
            bind_count += 1;
            query.push_str(&format!(", sku = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1");

        let mut q = sqlx::query(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(category_id) = data.category_id {
            q = q.bind(category_id);
        }
        if let Some(subcategory_id) = data.subcategory_id {
            q = q.bind(subcategory_id);
        }
        if let Some(stock) = data.stock {
            q = q.bind(stock);
        }
        if let Some(sku) = data.sku {
            q = q.bind(sku);
        }

        let result = q.execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(images) = data.images {
            sqlx::query("DELETE FROM product_images WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_images(&mut tx, id, &images).await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Deletes a product by id
    ///
    /// Returns whether a row was affected. Image records are removed by the
    /// store's cascade rule.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Inserts image records for a product, preserving list order via `position`
async fn insert_images(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: i64,
    images: &[String],
) -> Result<(), sqlx::Error> {
    for (position, path) in images.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO product_images (product_id, path, position)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(product_id)
        .bind(path)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
