//! SubCategory endpoints
//!
//! Create and update accept multipart form data (`name`, `description`,
//! `category_id`, optional `image` file). The owning category must exist;
//! handlers resolve it before writing so unknown parents surface as 404
//! rather than raw foreign-key failures.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};

use shopadmin_shared::models::{
    category::Category,
    subcategory::{CreateSubCategory, SubCategory, UpdateSubCategory},
};

use super::{non_empty, parse_field, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    uploads::UploadStore,
};

/// Parsed subcategory form fields
#[derive(Debug, Default)]
struct SubCategoryForm {
    name: Option<String>,
    description: Option<String>,
    category_id: Option<i64>,
    image: Option<String>,
}

/// Reads a multipart subcategory form, storing any uploaded image
async fn read_form(
    multipart: &mut Multipart,
    uploads: &UploadStore,
) -> ApiResult<SubCategoryForm> {
    let mut form = SubCategoryForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = non_empty(field.text().await?),
            "description" => form.description = non_empty(field.text().await?),
            "category_id" => {
                if let Some(value) = non_empty(field.text().await?) {
                    form.category_id = Some(parse_field("category_id", &value)?);
                }
            }
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

/// Resolves the owning category or fails with 404
async fn require_category(state: &AppState, category_id: i64) -> ApiResult<()> {
    Category::find_by_id(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(())
}

/// GET /api/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SubCategory>>> {
    let subcategories = SubCategory::find_all(&state.db).await?;
    Ok(Json(subcategories))
}

/// GET /api/subcategories/:id
pub async fn get_subcategory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SubCategory>> {
    let subcategory = SubCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sub category not found".to_string()))?;

    Ok(Json(subcategory))
}

/// POST /api/subcategories
pub async fn create_subcategory(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SubCategory>)> {
    let form = read_form(&mut multipart, &state.uploads).await?;

    let (name, category_id) = match (form.name, form.category_id) {
        (Some(name), Some(category_id)) => (name, category_id),
        _ => {
            return Err(ApiError::BadRequest(
                "Name and category_id are required".to_string(),
            ))
        }
    };

    require_category(&state, category_id).await?;

    let id = SubCategory::create(
        &state.db,
        CreateSubCategory {
            name,
            description: form.description,
            category_id,
            image: form.image,
        },
    )
    .await?;

    let subcategory = SubCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Failed to load created sub category".to_string()))?;

    tracing::info!(subcategory_id = id, category_id, "Created sub category");

    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// PUT /api/subcategories/:id
///
/// Merge update: only provided fields are written. A new `category_id` is
/// resolved before the write.
pub async fn update_subcategory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<SubCategory>> {
    SubCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sub category not found".to_string()))?;

    let form = read_form(&mut multipart, &state.uploads).await?;

    if let Some(category_id) = form.category_id {
        require_category(&state, category_id).await?;
    }

    SubCategory::update(
        &state.db,
        id,
        UpdateSubCategory {
            name: form.name,
            description: form.description,
            category_id: form.category_id,
            image: form.image,
        },
    )
    .await?;

    let subcategory = SubCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sub category not found".to_string()))?;

    Ok(Json(subcategory))
}

/// DELETE /api/subcategories/:id
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = SubCategory::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Sub category not found".to_string()));
    }

    tracing::info!(subcategory_id = id, "Deleted sub category");

    Ok(Json(MessageResponse {
        message: "Sub category deleted successfully".to_string(),
    }))
}
