mod image_upload;
mod product;

pub use image_upload::{content_hash, ImageUpload, ValidatedImage};
pub use product::{ImageReference, Product, ProductRecord, ProductWithCategory};
