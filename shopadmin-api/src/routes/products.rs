//! Product endpoints
//!
//! Create and update accept multipart form data (`name`, `description`,
//! `price`, `category_id`, `subcategory_id`, `stock`, `sku`, and up to
//! five `images` files). Both parent ids are resolved before writing, and
//! the product row plus its image records are written transactionally in
//! the model layer.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

use shopadmin_shared::models::{
    category::Category,
    product::{CreateProduct, Product, UpdateProduct},
    subcategory::SubCategory,
};

use super::{non_empty, parse_field, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::{UploadStore, MAX_PRODUCT_IMAGES},
};

/// Parsed product form fields
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
    stock: Option<i32>,
    sku: Option<String>,
    /// Stored paths of uploaded files, in submission order
    images: Vec<String>,
}

/// Reads a multipart product form, storing uploaded images as they arrive
async fn read_form(multipart: &mut Multipart, uploads: &UploadStore) -> ApiResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = non_empty(field.text().await?),
            "description" => form.description = non_empty(field.text().await?),
            "price" => {
                if let Some(value) = non_empty(field.text().await?) {
                    form.price = Some(parse_field("price", &value)?);
                }
            }
            "category_id" => {
                if let Some(value) = non_empty(field.text().await?) {
                    form.category_id = Some(parse_field("category_id", &value)?);
                }
            }
            "subcategory_id" => {
                if let Some(value) = non_empty(field.text().await?) {
                    form.subcategory_id = Some(parse_field("subcategory_id", &value)?);
                }
            }
            "stock" => {
                if let Some(value) = non_empty(field.text().await?) {
                    form.stock = Some(parse_field("stock", &value)?);
                }
            }
            "sku" => form.sku = non_empty(field.text().await?),
            "images" => {
                if form.images.len() >= MAX_PRODUCT_IMAGES {
                    return Err(ApiError::BadRequest(format!(
                        "A product can have at most {} images",
                        MAX_PRODUCT_IMAGES
                    )));
                }
                let file_name = field.file_name().map(str::to_string).unwrap_or_default();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if !data.is_empty() {
                    form.images.push(
                        uploads
                            .save(&file_name, content_type.as_deref(), data)
                            .await?,
                    );
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validates that a price is positive
fn require_positive(price: Decimal) -> ApiResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(ApiError::BadRequest("Price must be positive".to_string()));
    }
    Ok(price)
}

/// Resolves the owning category or fails with 404
async fn require_category(state: &AppState, category_id: i64) -> ApiResult<()> {
    Category::find_by_id(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(())
}

/// Resolves the owning subcategory or fails with 404
async fn require_subcategory(state: &AppState, subcategory_id: i64) -> ApiResult<()> {
    SubCategory::find_by_id(&state.db, subcategory_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sub category not found".to_string()))?;
    Ok(())
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::find_all(&state.db).await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let form = read_form(&mut multipart, &state.uploads).await?;

    let (name, price, category_id, subcategory_id) = match (
        form.name,
        form.price,
        form.category_id,
        form.subcategory_id,
    ) {
        (Some(name), Some(price), Some(category_id), Some(subcategory_id)) => {
            (name, price, category_id, subcategory_id)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Name, price, category_id, and subcategory_id are required".to_string(),
            ))
        }
    };

    let price = require_positive(price)?;
    require_category(&state, category_id).await?;
    require_subcategory(&state, subcategory_id).await?;

    let id = Product::create(
        &state.db,
        CreateProduct {
            name,
            description: form.description,
            price,
            category_id,
            subcategory_id,
            stock: form.stock.unwrap_or(0),
            sku: form.sku,
            images: form.images,
        },
    )
    .await?;

    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Failed to load created product".to_string()))?;

    tracing::info!(product_id = id, category_id, subcategory_id, "Created product");

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id
///
/// Merge update: only provided fields are written. Newly uploaded images
/// replace the stored image list; a request without files leaves the
/// existing images untouched.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Product>> {
    Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let form = read_form(&mut multipart, &state.uploads).await?;

    let price = form.price.map(require_positive).transpose()?;

    if let Some(category_id) = form.category_id {
        require_category(&state, category_id).await?;
    }
    if let Some(subcategory_id) = form.subcategory_id {
        require_subcategory(&state, subcategory_id).await?;
    }

    let images = if form.images.is_empty() {
        None
    } else {
        Some(form.images)
    };

    Product::update(
        &state.db,
        id,
        UpdateProduct {
            name: form.name,
            description: form.description,
            price,
            category_id: form.category_id,
            subcategory_id: form.subcategory_id,
            stock: form.stock,
            sku: form.sku,
            images,
        },
    )
    .await?;

    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Product::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = id, "Deleted product");

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive_rejects_zero_and_negative() {
        assert!(require_positive(Decimal::ZERO).is_err());
        assert!(require_positive(Decimal::new(-100, 2)).is_err());
        assert_eq!(
            require_positive(Decimal::new(999, 2)).unwrap(),
            Decimal::new(999, 2)
        );
    }
}
