use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::products::handlers::{self, ProductState};
use crate::features::products::services::{ImageReconciler, ProductService};
use crate::shared::constants::MAX_UPLOAD_BODY_SIZE;

/// Create routes for the products feature
pub fn routes(
    product_service: Arc<ProductService>,
    image_reconciler: Arc<ImageReconciler>,
) -> Router {
    let state = ProductState {
        product_service,
        image_reconciler,
    };

    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/maintenance/images", get(handlers::get_image_report))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_SIZE))
        .with_state(state)
}
