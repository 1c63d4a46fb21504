use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::models::{Product, ProductRecord, ProductWithCategory};
use crate::shared::types::PaginationQuery;

/// Query params for listing products
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Only return products whose name contains this text (case-sensitive)
    pub name: Option<String>,
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,
    /// Products per page (default: 3, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

impl ListProductsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Product fields sent on create and update.
///
/// On create every field is required. On update missing fields keep their
/// stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductFieldsDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "crate::shared::validation::not_blank", message = "Name must not be blank")
    )]
    #[schema(example = "Shirt")]
    pub name: Option<String>,

    #[schema(value_type = Option<f64>, example = 50000)]
    pub price: Option<Decimal>,

    /// Accepts a number or a numeric string
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[schema(example = 1)]
    pub category_id: Option<i32>,
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdOrString {
        Id(i32),
        Text(String),
    }

    match Option::<IdOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdOrString::Id(id)) => Ok(Some(id)),
        Some(IdOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(IdOrString::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid categoryId: '{}'", text))),
    }
}

impl ProductFieldsDto {
    fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.price.is_some_and(|price| price < Decimal::ZERO) {
            return Err(AppError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the row for a new product; all fields must be present
    pub fn into_record(self, image: String, image_url: String) -> Result<ProductRecord> {
        self.check()?;

        let name = self
            .name
            .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
        let price = self
            .price
            .ok_or_else(|| AppError::Validation("price is required".to_string()))?;
        let category_id = self
            .category_id
            .ok_or_else(|| AppError::Validation("categoryId is required".to_string()))?;

        Ok(ProductRecord {
            name: name.trim().to_string(),
            price,
            image,
            image_url,
            category_id,
        })
    }

    /// Merge onto an existing product; absent fields keep stored values
    pub fn merge_into(
        self,
        existing: &Product,
        image: String,
        image_url: String,
    ) -> Result<ProductRecord> {
        self.check()?;

        Ok(ProductRecord {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| existing.name.clone()),
            price: self.price.unwrap_or(existing.price),
            image,
            image_url,
            category_id: self.category_id.unwrap_or(existing.category_id),
        })
    }
}

/// Multipart form accepted by `POST /products` and `PUT /products/{id}`.
/// Documentation only, the handlers read the multipart stream directly.
#[derive(Debug, ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct ProductFormDto {
    #[schema(example = "Shirt")]
    pub name: String,
    #[schema(example = "50000")]
    pub price: String,
    #[schema(example = "1")]
    pub category_id: String,
    /// Product image (.png, .jpg or .jpeg, at most 5,000,000 bytes)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// Response DTO for a product row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponseDto {
    pub id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Stored file name, `<sha256 of content><extension>`
    pub image: String,
    pub image_url: String,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponseDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            image: p.image,
            image_url: p.image_url,
            category_id: p.category_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Response DTO for a product with its category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailResponseDto {
    pub id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image: String,
    pub image_url: String,
    pub category_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: CategorySummaryDto,
}

impl From<ProductWithCategory> for ProductDetailResponseDto {
    fn from(row: ProductWithCategory) -> Self {
        let p = row.product;
        Self {
            category: CategorySummaryDto {
                id: p.category_id,
                name: row.category_name,
            },
            id: p.id,
            name: p.name,
            price: p.price,
            image: p.image,
            image_url: p.image_url,
            category_id: p.category_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
