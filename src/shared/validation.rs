use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for names accepted by the image store
    /// A single path component: alphanumeric stem with an optional extension
    /// - Valid: "9f86d081884c7d65.png", "a1b2.JPG", "legacy_image-1.jpeg"
    /// - Invalid: "../etc/passwd", "a/b.png", ".hidden", "", "x.tar.gz"
    pub static ref STORED_FILE_NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_-]+(?:\.[A-Za-z0-9]+)?$").unwrap();
}

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
