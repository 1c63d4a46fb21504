/// Default number of products per page
pub const DEFAULT_PRODUCT_PAGE_LIMIT: i64 = 3;

/// Maximum page size allowed
pub const MAX_PAGE_LIMIT: i64 = 100;

// =============================================================================
// IMAGE UPLOADS
// =============================================================================

/// Largest accepted product image, in bytes
pub const MAX_IMAGE_SIZE: usize = 5_000_000;

/// Accepted image extensions (compared case-insensitively)
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Request body limit for product uploads. Leaves headroom above
/// `MAX_IMAGE_SIZE` so oversized images reach validation and get a 422.
pub const MAX_UPLOAD_BODY_SIZE: usize = 2 * MAX_IMAGE_SIZE + 1024 * 1024;

/// Public path uploaded images are served under
pub const IMAGES_PATH: &str = "/images";
