use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::error::Result;
use crate::features::products::dtos::{DanglingImageDto, ImageReportDto};
use crate::features::products::repositories::ProductRepository;
use crate::modules::storage::ImageStore;
use crate::shared::keyed_lock::KeyedLock;

/// Compares the image directory with the product table.
///
/// Orphan files are stored images no product references. Dangling products
/// reference a file that is missing from the store.
pub struct ImageReconciler {
    repository: Arc<dyn ProductRepository>,
    image_store: Arc<ImageStore>,
    image_locks: KeyedLock<String>,
}

impl ImageReconciler {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        image_store: Arc<ImageStore>,
        image_locks: KeyedLock<String>,
    ) -> Self {
        Self {
            repository,
            image_store,
            image_locks,
        }
    }

    pub async fn scan(&self) -> Result<ImageReportDto> {
        let files = self.image_store.list().await?;
        let references = self.repository.list_image_references().await?;

        let stored: HashSet<&str> = files.iter().map(String::as_str).collect();
        let referenced: HashSet<&str> = references.iter().map(|r| r.image.as_str()).collect();

        let orphan_files = files
            .iter()
            .filter(|f| !referenced.contains(f.as_str()))
            .cloned()
            .collect();
        let dangling_products = references
            .iter()
            .filter(|r| !stored.contains(r.image.as_str()))
            .map(|r| DanglingImageDto {
                id: r.product_id,
                image: r.image.clone(),
            })
            .collect();

        Ok(ImageReportDto {
            orphan_files,
            dangling_products,
        })
    }

    /// Delete orphan files, re-checking each one under its lock so a file
    /// picked up by a concurrent create is kept
    pub async fn remove_orphans(&self) -> Result<Vec<String>> {
        let report = self.scan().await?;
        let mut removed = Vec::new();

        for name in report.orphan_files {
            let _guard = self.image_locks.lock(name.clone()).await;
            match self.repository.count_image_references(&name).await {
                Ok(0) => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping orphan {}: reference check failed: {}", name, e);
                    continue;
                }
            }
            match self.image_store.remove(&name).await {
                Ok(true) => removed.push(name),
                Ok(false) => {}
                Err(e) => warn!("Failed to remove orphan {}: {}", name, e),
            }
        }

        Ok(removed)
    }

    /// Log the state of the store at startup, optionally deleting orphans
    pub async fn run_startup_sweep(&self, cleanup: bool) -> Result<()> {
        let report = self.scan().await?;

        for dangling in &report.dangling_products {
            warn!(
                "Product {} references missing image {}",
                dangling.id, dangling.image
            );
        }

        if report.is_clean() {
            info!("Image store consistent with products");
            return Ok(());
        }
        if report.orphan_files.is_empty() {
            return Ok(());
        }

        if cleanup {
            let removed = self.remove_orphans().await?;
            info!("Removed {} orphan image(s)", removed.len());
        } else {
            warn!(
                "Found {} orphan image(s), set IMAGE_ORPHAN_CLEANUP=true to remove them",
                report.orphan_files.len()
            );
        }

        Ok(())
    }
}
