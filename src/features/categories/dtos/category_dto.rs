use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::Category;

/// Query params for listing categories
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesQuery {
    /// Only return categories whose name contains this text (case-sensitive)
    pub name: Option<String>,
}

/// Request DTO for creating or renaming a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertCategoryDto {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "crate::shared::validation::not_blank", message = "Name must not be blank")
    )]
    #[schema(example = "Clothing")]
    pub name: String,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// `{id, name}` view of a category embedded in product responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummaryDto {
    pub id: i32,
    pub name: String,
}

/// Response DTO for the category listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryListResponseDto {
    pub categories: Vec<CategoryResponseDto>,
    pub total_categories: usize,
}

impl From<Vec<CategoryResponseDto>> for CategoryListResponseDto {
    fn from(categories: Vec<CategoryResponseDto>) -> Self {
        Self {
            total_categories: categories.len(),
            categories,
        }
    }
}
