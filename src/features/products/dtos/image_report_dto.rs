use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of comparing the image store with the products table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageReportDto {
    /// Files in the image store that no product references
    pub orphan_files: Vec<String>,
    /// Products whose image file is missing from the store
    pub dangling_products: Vec<DanglingImageDto>,
}

impl ImageReportDto {
    pub fn is_clean(&self) -> bool {
        self.orphan_files.is_empty() && self.dangling_products.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DanglingImageDto {
    pub id: i32,
    pub image: String,
}
