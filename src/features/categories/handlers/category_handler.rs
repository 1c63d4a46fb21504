use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppJsonRejection, AppPath, AppQuery};
use crate::features::categories::dtos::{
    CategoryListResponseDto, CategoryResponseDto, ListCategoriesQuery, UpsertCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ErrorResponse, MessageOnlyResponse, MessageResponse};

/// List categories
///
/// Returns every category whose name contains `name`, ordered by name.
#[utoipa::path(
    get,
    path = "/categories",
    params(ListCategoriesQuery),
    responses(
        (status = 200, description = "List of categories", body = CategoryListResponseDto),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<ListCategoriesQuery>,
) -> Result<Json<CategoryListResponseDto>> {
    let list = service.list(query.name.as_deref()).await?;
    Ok(Json(list))
}

/// Get category by id
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryResponseDto),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<CategoryResponseDto>> {
    let category = service.get_by_id(id).await?;
    Ok(Json(category))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    request_body = UpsertCategoryDto,
    responses(
        (status = 201, description = "Category created", body = MessageResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<UpsertCategoryDto>,
) -> Result<(StatusCode, Json<MessageResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_data(
            "Category Created Successfuly",
            category,
        )),
    ))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    request_body = UpsertCategoryDto,
    responses(
        (status = 201, description = "Category updated", body = MessageOnlyResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
    body: std::result::Result<AppJson<UpsertCategoryDto>, AppJsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse<()>>)> {
    // A missing category answers 404 before the body is looked at
    service.get_by_id(id).await?;

    let AppJson(dto) = body?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.update(id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::message("Category Updated Successfuly")),
    ))
}

/// Delete a category
///
/// Categories that still have products are not deleted (409).
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageOnlyResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category still has products", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(MessageResponse::message("Category Deleted Successfuly")))
}
