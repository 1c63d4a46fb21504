//! Local image store
//!
//! Product images live in one flat directory. Files are named by their content
//! hash plus original extension, so storing the same bytes twice lands on the
//! same file and is a no-op.
//!
//! Writes go to a hidden temporary file first and are renamed into place, so a
//! visible file is always complete.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::validation::STORED_FILE_NAME_REGEX;

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the image directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        info!("Image store ready at {}", self.root.display());
        Ok(())
    }

    /// Resolve a stored name to its path, rejecting anything that is not a
    /// single plain file name
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if !STORED_FILE_NAME_REGEX.is_match(name) {
            return Err(AppError::BadRequest(format!(
                "Invalid image file name: '{}'",
                name
            )));
        }
        Ok(self.root.join(name))
    }

    /// Write `data` under `name`. Existing files are left untouched.
    pub async fn store(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;

        if fs::try_exists(&path).await? {
            debug!("Image {} already stored, skipping write", name);
            return Ok(());
        }

        let tmp_path = self.root.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!("Image stored: {} ({} bytes)", name, data.len());
        Ok(())
    }

    /// Remove `name` from the store. Returns `false` if it was already gone.
    pub async fn remove(&self, name: &str) -> Result<bool> {
        let path = self.resolve(name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Image removed: {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Image {} was already missing from the store", name);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.resolve(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Names of all stored images. Temporary files are excluded, and so are
    /// files whose names the store would refuse to resolve.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with('.') {
                    continue;
                }
                if !STORED_FILE_NAME_REGEX.is_match(name) {
                    warn!("Ignoring unmanaged file in image store: '{}'", name);
                    continue;
                }
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
