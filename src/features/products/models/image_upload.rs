use std::path::Path;

use axum::body::Bytes;
use sha2::{Digest, Sha256};

use crate::core::error::{AppError, Result};
use crate::shared::constants::{ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_SIZE};

/// An image file as received in a multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_filename: String,
    pub data: Bytes,
}

/// An upload that passed validation, named by its content
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub file_name: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(original_filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            original_filename: original_filename.into(),
            data: data.into(),
        }
    }

    /// Extension of the original file name including the dot (`".png"`),
    /// empty when there is none. Case is preserved.
    pub fn extension(&self) -> String {
        Path::new(&self.original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }

    /// Check extension then size, and derive the stored file name
    pub fn validate(self) -> Result<ValidatedImage> {
        let extension = self.extension();

        if !is_allowed_extension(&extension) {
            return Err(AppError::InvalidFileType(extension));
        }
        if self.data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::FileTooLarge(self.data.len()));
        }

        Ok(ValidatedImage {
            file_name: format!("{}{}", content_hash(&self.data), extension),
            data: self.data,
        })
    }
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

/// Lowercase hex SHA-256 digest of `data`
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
