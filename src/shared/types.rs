use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PRODUCT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// `{ "message": ..., "data": ... }` envelope returned by mutating endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> MessageResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl MessageResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// `{ "message": ... }` body of mutating endpoints that return no data.
/// Documentation only, handlers build it with `MessageResponse::message`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct MessageOnlyResponse {
    pub message: String,
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Offset/limit pagination query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Number of items per page (default: 3, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

impl PaginationQuery {
    /// Page number, anything below 1 is treated as the first page
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get clamped limit (respects MAX_PAGE_LIMIT)
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PRODUCT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Calculate SQL OFFSET from page number
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}
