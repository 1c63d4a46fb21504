use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::constants::MAX_IMAGE_SIZE;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Filesystem(#[from] std::io::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("No File Uploaded")]
    NoFile,

    #[error("Invalid Images")]
    InvalidFileType(String),

    #[error("Image must be less than 5 MB")]
    FileTooLarge(usize),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// The "No Data Found" error used for missing categories and products
    pub fn no_data_found() -> Self {
        AppError::NotFound("No Data Found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Filesystem(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NoFile => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidFileType(_)
            | AppError::FileTooLarge(_)
            | AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Filesystem(e) => tracing::error!("Filesystem error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::InvalidFileType(ext) => {
                tracing::debug!("Rejected image with extension '{}'", ext)
            }
            AppError::FileTooLarge(size) => tracing::debug!(
                "Rejected image of {} bytes (limit {})",
                size,
                MAX_IMAGE_SIZE
            ),
            _ => {}
        }

        let body = Json(ErrorResponse {
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
