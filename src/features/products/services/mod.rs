mod image_reconciler;
mod product_service;

pub use image_reconciler::ImageReconciler;
pub use product_service::ProductService;
