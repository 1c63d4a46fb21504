//! Storage module for product images
//!
//! Provides a flat, content-addressed image directory on the local filesystem.

mod image_store;

pub use image_store::ImageStore;
