use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::shared::types::{ErrorResponse, MessageOnlyResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Products
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Maintenance
        products_handlers::get_image_report,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageOnlyResponse,
            // Categories
            categories_dtos::UpsertCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryListResponseDto,
            MessageResponse<categories_dtos::CategoryResponseDto>,
            // Products
            products_dtos::ProductFieldsDto,
            products_dtos::ProductFormDto,
            products_dtos::ProductResponseDto,
            products_dtos::ProductDetailResponseDto,
            MessageResponse<products_dtos::ProductResponseDto>,
            // Maintenance
            products_dtos::ImageReportDto,
            products_dtos::DanglingImageDto,
        )
    ),
    tags(
        (name = "categories", description = "Product categories"),
        (name = "products", description = "Products and their images"),
        (name = "maintenance", description = "Image store consistency checks"),
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "API documentation for the product catalog",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
