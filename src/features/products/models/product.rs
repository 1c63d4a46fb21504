use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database model for product
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    /// Stored image file name (`<content hash><ext>`)
    pub image: String,
    pub image_url: String,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row joined with its category name
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: String,
}

/// Column values written on insert and update
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub image_url: String,
    pub category_id: i32,
}

/// A product's claim on a stored image
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ImageReference {
    pub product_id: i32,
    pub image: String,
}
