use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppPath, AppQuery, RequestOrigin};
use crate::features::products::dtos::{
    ImageReportDto, ListProductsQuery, ProductDetailResponseDto, ProductFieldsDto,
    ProductFormDto, ProductResponseDto,
};
use crate::features::products::handlers::ProductPayload;
use crate::features::products::services::{ImageReconciler, ProductService};
use crate::shared::types::{ErrorResponse, MessageOnlyResponse, MessageResponse};

/// Shared state of the products router
#[derive(Clone)]
pub struct ProductState {
    pub product_service: Arc<ProductService>,
    pub image_reconciler: Arc<ImageReconciler>,
}

/// List products
///
/// Products whose name contains `name`, ordered by id, one page at a time.
#[utoipa::path(
    get,
    path = "/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products", body = Vec<ProductDetailResponseDto>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<ProductState>,
    AppQuery(query): AppQuery<ListProductsQuery>,
) -> Result<Json<Vec<ProductDetailResponseDto>>> {
    let products = state.product_service.list(&query).await?;
    Ok(Json(products))
}

/// Get product by id
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductDetailResponseDto),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<ProductState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ProductDetailResponseDto>> {
    let product = state.product_service.get_by_id(id).await?;
    Ok(Json(product))
}

/// Create a product
///
/// `image` is required: `.png`, `.jpg` or `.jpeg`, at most 5,000,000 bytes.
#[utoipa::path(
    post,
    path = "/products",
    request_body(content = ProductFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = MessageResponse<ProductResponseDto>),
        (status = 400, description = "Missing field or file", body = ErrorResponse),
        (status = 422, description = "Invalid image or unknown category", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<ProductState>,
    origin: RequestOrigin,
    payload: ProductPayload,
) -> Result<(StatusCode, Json<MessageResponse<ProductResponseDto>>)> {
    let product = state
        .product_service
        .create(payload.fields, payload.image, origin.as_str())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::with_data(
            "Product Created Successfuly",
            product,
        )),
    ))
}

/// Update a product
///
/// Absent fields keep their stored values. Sending a new image replaces the
/// old one.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body(
        content(
            (ProductFormDto = "multipart/form-data"),
            (ProductFieldsDto = "application/json")
        )
    ),
    responses(
        (status = 200, description = "Product updated", body = MessageResponse<ProductResponseDto>),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 422, description = "Invalid image or unknown category", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<ProductState>,
    AppPath(id): AppPath<i32>,
    origin: RequestOrigin,
    payload: ProductPayload,
) -> Result<Json<MessageResponse<ProductResponseDto>>> {
    let product = state
        .product_service
        .update(id, payload.fields, payload.image, origin.as_str())
        .await?;

    Ok(Json(MessageResponse::with_data(
        "Product Updated Successfuly",
        product,
    )))
}

/// Delete a product and its image
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageOnlyResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<ProductState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse<()>>> {
    state.product_service.delete(id).await?;
    Ok(Json(MessageResponse::message("Product Deleted Successfuly")))
}

/// Compare stored images with product rows
#[utoipa::path(
    get,
    path = "/maintenance/images",
    responses(
        (status = 200, description = "Orphan files and dangling products", body = ImageReportDto),
    ),
    tag = "maintenance"
)]
pub async fn get_image_report(State(state): State<ProductState>) -> Result<Json<ImageReportDto>> {
    let report = state.image_reconciler.scan().await?;
    Ok(Json(report))
}
