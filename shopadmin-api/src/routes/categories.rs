//! Category endpoints
//!
//! Create and update accept multipart form data (`name`, `description`,
//! optional `image` file). Deleting a category cascades to its
//! subcategories and products through the store's foreign keys.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use shopadmin_shared::models::category::{Category, CreateCategory, UpdateCategory};

use super::{non_empty, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::UploadStore,
};

/// Parsed category form fields
#[derive(Debug, Default)]
struct CategoryForm {
    name: Option<String>,
    description: Option<String>,
    image: Option<String>,
}

/// Reads a multipart category form, storing any uploaded image
async fn read_form(multipart: &mut Multipart, uploads: &UploadStore) -> ApiResult<CategoryForm> {
    let mut form = CategoryForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = non_empty(field.text().await?),
            "description" => form.description = non_empty(field.text().await?),
            "image" => {
                let file_name = field.file_name().map(str::to_string).unwrap_or_default();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if !data.is_empty() {
                    form.image = Some(
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

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::find_all(&state.db).await?;
    Ok(Json(categories))
}

/// GET /api/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let form = read_form(&mut multipart, &state.uploads).await?;

    let name = form
        .name
        .ok_or_else(|| ApiError::BadRequest("Category name is required".to_string()))?;

    if Category::find_by_name(&state.db, &name).await?.is_some() {
        return Err(ApiError::Conflict("Category already exists".to_string()));
    }

    let id = Category::create(
        &state.db,
        CreateCategory {
            name,
            description: form.description,
            image: form.image,
        },
    )
    .await?;

    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Failed to load created category".to_string()))?;

    tracing::info!(category_id = id, "Created category");

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:id
///
/// Merge update: only provided fields are written; a renamed category is
/// re-checked for name uniqueness first.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Category>> {
    let existing = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let form = read_form(&mut multipart, &state.uploads).await?;

    if let Some(ref name) = form.name {
        if *name != existing.name && Category::find_by_name(&state.db, name).await?.is_some() {
            return Err(ApiError::Conflict(
                "Category name already exists".to_string(),
            ));
        }
    }

    Category::update(
        &state.db,
        id,
        UpdateCategory {
            name: form.name,
            description: form.description,
            image: form.image,
        },
    )
    .await?;

    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Category::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    tracing::info!(category_id = id, "Deleted category");

    Ok(Json(MessageResponse {
        message: "Category deleted successfully".to_string(),
    }))
}
