use std::sync::Arc;

use tracing::{debug, error, info};

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{
    ListProductsQuery, ProductDetailResponseDto, ProductFieldsDto, ProductResponseDto,
};
use crate::features::products::models::{ImageUpload, Product, ProductRecord, ValidatedImage};
use crate::features::products::repositories::ProductRepository;
use crate::modules::storage::ImageStore;
use crate::shared::constants::IMAGES_PATH;
use crate::shared::keyed_lock::KeyedLock;

/// Service for product operations and the lifecycle of product images
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    image_store: Arc<ImageStore>,
    public_base_url: Option<String>,
    product_locks: KeyedLock<i32>,
    image_locks: KeyedLock<String>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        image_store: Arc<ImageStore>,
        image_locks: KeyedLock<String>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            repository,
            image_store,
            public_base_url,
            product_locks: KeyedLock::new(),
            image_locks,
        }
    }

    /// Public URL of a stored image. `origin` is the scheme and host of the
    /// current request, used unless a public base URL is configured.
    fn image_url(&self, origin: &str, file_name: &str) -> String {
        let base = self.public_base_url.as_deref().unwrap_or(origin);
        format!("{}{}/{}", base.trim_end_matches('/'), IMAGES_PATH, file_name)
    }

    pub async fn list(&self, query: &ListProductsQuery) -> Result<Vec<ProductDetailResponseDto>> {
        let pagination = query.pagination();
        let products = self
            .repository
            .list(
                query.name.as_deref().unwrap_or(""),
                pagination.offset(),
                pagination.limit(),
            )
            .await?;

        Ok(products.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<ProductDetailResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(AppError::no_data_found)
    }

    /// Create a product from its fields and a mandatory image.
    ///
    /// Everything is validated before the file is written. The file is stored
    /// before the row is inserted; a failed insert removes the file again
    /// unless another product already uses the same content.
    pub async fn create(
        &self,
        fields: ProductFieldsDto,
        image: Option<ImageUpload>,
        origin: &str,
    ) -> Result<ProductResponseDto> {
        let image = image.ok_or(AppError::NoFile)?.validate()?;
        let image_url = self.image_url(origin, &image.file_name);
        let record = fields.into_record(image.file_name.clone(), image_url)?;

        let _image_guard = self.image_locks.lock(image.file_name.clone()).await;
        self.image_store.store(&image.file_name, &image.data).await?;

        let product = match self.repository.create(&record).await {
            Ok(product) => product,
            Err(e) => {
                self.discard_unreferenced(&image.file_name).await;
                return Err(e);
            }
        };

        info!(
            "Product created: id={}, image={}, size={}",
            product.id,
            product.image,
            image.data.len()
        );

        Ok(product.into())
    }

    /// Update a product, optionally replacing its image.
    ///
    /// Order: store the new file, commit the row, then release the old file.
    pub async fn update(
        &self,
        id: i32,
        fields: ProductFieldsDto,
        image: Option<ImageUpload>,
        origin: &str,
    ) -> Result<ProductResponseDto> {
        let _product_guard = self.product_locks.lock(id).await;

        let existing = self
            .repository
            .get(id)
            .await?
            .ok_or_else(AppError::no_data_found)?;

        let new_image = image.map(ImageUpload::validate).transpose()?;
        let file_name = new_image
            .as_ref()
            .map(|img| img.file_name.clone())
            .unwrap_or_else(|| existing.image.clone());
        let image_url = self.image_url(origin, &file_name);
        let record = fields.merge_into(&existing, file_name, image_url)?;

        let updated = match new_image {
            Some(image) => self.update_with_new_image(id, &record, image).await?,
            None => self
                .repository
                .update(id, &record)
                .await?
                .ok_or_else(AppError::no_data_found)?,
        };

        if updated.image != existing.image {
            self.release_image(&existing.image).await;
        }

        info!("Product updated: id={}, image={}", updated.id, updated.image);

        Ok(updated.into())
    }

    async fn update_with_new_image(
        &self,
        id: i32,
        record: &ProductRecord,
        image: ValidatedImage,
    ) -> Result<Product> {
        let _image_guard = self.image_locks.lock(image.file_name.clone()).await;
        self.image_store.store(&image.file_name, &image.data).await?;

        match self.repository.update(id, record).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => {
                self.discard_unreferenced(&image.file_name).await;
                Err(AppError::no_data_found())
            }
            Err(e) => {
                self.discard_unreferenced(&image.file_name).await;
                Err(e)
            }
        }
    }

    /// Delete a product, then its image file if nothing else uses it
    pub async fn delete(&self, id: i32) -> Result<()> {
        let _product_guard = self.product_locks.lock(id).await;

        let deleted = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(AppError::no_data_found)?;

        self.release_image(&deleted.image).await;

        info!("Product deleted: id={}, image={}", deleted.id, deleted.image);

        Ok(())
    }

    /// Remove `file_name` from the store once no product references it.
    /// Runs after the row change is committed, so failures are logged rather
    /// than reported; the reconciler picks up anything left behind.
    async fn release_image(&self, file_name: &str) {
        let _image_guard = self.image_locks.lock(file_name.to_string()).await;
        self.discard_unreferenced(file_name).await;
    }

    /// Caller must hold the image lock for `file_name`
    async fn discard_unreferenced(&self, file_name: &str) {
        match self.repository.count_image_references(file_name).await {
            Ok(0) => match self.image_store.remove(file_name).await {
                Ok(true) => debug!("Released image {}", file_name),
                Ok(false) => {}
                Err(e) => error!("Failed to remove image {}: {}", file_name, e),
            },
            Ok(count) => debug!(
                "Image {} still used by {} product(s), keeping it",
                file_name, count
            ),
            Err(e) => error!(
                "Could not check references for image {}, keeping it: {}",
                file_name, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::features::products::models::content_hash;
    use crate::shared::constants::MAX_IMAGE_SIZE;
    use crate::shared::test_helpers::InMemoryCatalog;

    const ORIGIN: &str = "http://localhost:5000";

    struct Fixture {
        _temp: TempDir,
        catalog: InMemoryCatalog,
        store: Arc<ImageStore>,
        service: ProductService,
        category_id: i32,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let catalog = InMemoryCatalog::new();
        let store = Arc::new(ImageStore::new(temp.path()));
        let service = ProductService::new(
            Arc::new(catalog.clone()),
            Arc::clone(&store),
            KeyedLock::new(),
            None,
        );
        let category_id = catalog.seed_category("Clothing");
        Fixture {
            _temp: temp,
            catalog,
            store,
            service,
            category_id,
        }
    }

    fn fields(name: &str, price: i64, category_id: i32) -> ProductFieldsDto {
        ProductFieldsDto {
            name: Some(name.to_string()),
            price: Some(Decimal::from(price)),
            category_id: Some(category_id),
        }
    }

    fn png(bytes: &[u8]) -> Option<ImageUpload> {
        Some(ImageUpload::new("photo.png", bytes.to_vec()))
    }

    fn stored_name(bytes: &[u8], ext: &str) -> String {
        format!("{}{}", content_hash(bytes), ext)
    }

    #[tokio::test]
    async fn test_create_stores_image_by_content_hash() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 50000, f.category_id), png(b"shirt"), ORIGIN)
            .await
            .unwrap();

        let expected = stored_name(b"shirt", ".png");
        assert_eq!(created.image, expected);
        assert_eq!(
            created.image_url,
            format!("http://localhost:5000/images/{}", expected)
        );
        assert!(f.store.exists(&expected).await.unwrap());

        let fetched = f.service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.image, expected);
        assert_eq!(fetched.category.id, f.category_id);
        assert_eq!(fetched.category.name, "Clothing");
    }

    #[tokio::test]
    async fn test_create_without_file_is_no_file() {
        let f = fixture();
        let err = f
            .service
            .create(fields("Shirt", 1, f.category_id), None, ORIGIN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoFile));
        assert_eq!(f.catalog.product_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_before_writing() {
        let f = fixture();

        let err = f
            .service
            .create(
                fields("Shirt", 1, f.category_id),
                Some(ImageUpload::new("photo.gif", b"gif".to_vec())),
                ORIGIN,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));

        let err = f
            .service
            .create(
                fields("Shirt", 1, f.category_id),
                Some(ImageUpload::new("photo.jpg", vec![0u8; MAX_IMAGE_SIZE + 1])),
                ORIGIN,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge(_)));

        let err = f
            .service
            .create(
                ProductFieldsDto {
                    name: None,
                    ..fields("x", 1, f.category_id)
                },
                png(b"valid"),
                ORIGIN,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(f.store.list().await.unwrap().is_empty());
        assert_eq!(f.catalog.product_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_orphan() {
        let f = fixture();

        let err = f
            .service
            .create(fields("Shirt", 1, f.category_id + 100), png(b"shirt"), ORIGIN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert!(f.store.list().await.unwrap().is_empty());

        f.catalog.fail_product_writes(true);
        let err = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"shirt"), ORIGIN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(f.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_shared_file() {
        let f = fixture();
        let first = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"same"), ORIGIN)
            .await
            .unwrap();

        f.catalog.fail_product_writes(true);
        assert!(f
            .service
            .create(fields("Copy", 1, f.category_id), png(b"same"), ORIGIN)
            .await
            .is_err());

        assert!(f.store.exists(&first.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_content_shares_file() {
        let f = fixture();
        let a = f
            .service
            .create(fields("A", 1, f.category_id), png(b"same"), ORIGIN)
            .await
            .unwrap();
        let b = f
            .service
            .create(fields("B", 2, f.category_id), png(b"same"), ORIGIN)
            .await
            .unwrap();

        assert_eq!(a.image, b.image);
        assert_eq!(f.store.list().await.unwrap(), vec![a.image.clone()]);

        // Deleting one product keeps the file the other still uses
        f.service.delete(a.id).await.unwrap();
        assert!(f.store.exists(&b.image).await.unwrap());

        f.service.delete(b.id).await.unwrap();
        assert!(!f.store.exists(&b.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_file_and_rebuilds_url() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"shirt"), ORIGIN)
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                created.id,
                ProductFieldsDto {
                    name: Some("Polo".to_string()),
                    ..Default::default()
                },
                None,
                "https://shop.example.com",
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Polo");
        assert_eq!(updated.price, Decimal::from(1));
        assert_eq!(updated.image, created.image);
        assert_eq!(
            updated.image_url,
            format!("https://shop.example.com/images/{}", created.image)
        );
        assert!(f.store.exists(&created.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_with_image_replaces_file() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"old"), ORIGIN)
            .await
            .unwrap();

        let updated = f
            .service
            .update(
                created.id,
                ProductFieldsDto::default(),
                Some(ImageUpload::new("new.JPG", b"new".to_vec())),
                ORIGIN,
            )
            .await
            .unwrap();

        assert_eq!(updated.image, stored_name(b"new", ".JPG"));
        assert!(!f.store.exists(&created.image).await.unwrap());
        assert!(f.store.exists(&updated.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_with_same_image_keeps_file() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"same"), ORIGIN)
            .await
            .unwrap();

        let updated = f
            .service
            .update(created.id, ProductFieldsDto::default(), png(b"same"), ORIGIN)
            .await
            .unwrap();

        assert_eq!(updated.image, created.image);
        assert!(f.store.exists(&created.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_old_file_is_not_fatal() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"old"), ORIGIN)
            .await
            .unwrap();
        f.store.remove(&created.image).await.unwrap();

        let updated = f
            .service
            .update(created.id, ProductFieldsDto::default(), png(b"new"), ORIGIN)
            .await
            .unwrap();
        assert!(f.store.exists(&updated.image).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_invalid_image_changes_nothing() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"old"), ORIGIN)
            .await
            .unwrap();

        let err = f
            .service
            .update(
                created.id,
                fields("Renamed", 9, f.category_id),
                Some(ImageUpload::new("doc.pdf", b"pdf".to_vec())),
                ORIGIN,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));

        let current = f.service.get_by_id(created.id).await.unwrap();
        assert_eq!(current.name, "Shirt");
        assert_eq!(current.image, created.image);
        assert_eq!(f.store.list().await.unwrap(), vec![created.image]);
    }

    #[tokio::test]
    async fn test_update_oversized_image_changes_nothing() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"old"), ORIGIN)
            .await
            .unwrap();

        let err = f
            .service
            .update(
                created.id,
                fields("Renamed", 9, f.category_id),
                Some(ImageUpload::new("big.png", vec![0u8; MAX_IMAGE_SIZE + 1])),
                ORIGIN,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);

        let current = f.service.get_by_id(created.id).await.unwrap();
        assert_eq!(current.name, "Shirt");
        assert_eq!(current.image, created.image);
        assert_eq!(f.store.list().await.unwrap(), vec![created.image]);
    }

    #[tokio::test]
    async fn test_update_failure_discards_new_file() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"old"), ORIGIN)
            .await
            .unwrap();

        f.catalog.fail_product_writes(true);
        assert!(f
            .service
            .update(created.id, ProductFieldsDto::default(), png(b"new"), ORIGIN)
            .await
            .is_err());

        assert_eq!(f.store.list().await.unwrap(), vec![created.image]);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found_without_mutation() {
        let f = fixture();

        let err = f
            .service
            .update(404, ProductFieldsDto::default(), png(b"x"), ORIGIN)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = f.service.delete(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = f.service.get_by_id(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(f.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_file() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"shirt"), ORIGIN)
            .await
            .unwrap();

        f.service.delete(created.id).await.unwrap();

        assert!(!f.store.exists(&created.image).await.unwrap());
        let err = f.service.get_by_id(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_with_missing_file_succeeds() {
        let f = fixture();
        let id = f.catalog.seed_product("Legacy", f.category_id, "gone.png");

        f.service.delete(id).await.unwrap();
        assert_eq!(f.catalog.product_count(), 0);
    }

    #[tokio::test]
    async fn test_list_paginates_and_filters() {
        let f = fixture();
        for (i, name) in ["Shirt", "Shoes", "Hat", "Short", "Shawl"].iter().enumerate() {
            f.service
                .create(
                    fields(name, 10, f.category_id),
                    png(format!("img-{}", i).as_bytes()),
                    ORIGIN,
                )
                .await
                .unwrap();
        }

        let first = f
            .service
            .list(&ListProductsQuery::default())
            .await
            .unwrap();
        let names: Vec<&str> = first.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Shirt", "Shoes", "Hat"]);

        let query = ListProductsQuery {
            name: Some("Sh".to_string()),
            page: Some(2),
            limit: Some(2),
        };
        let second = f.service.list(&query).await.unwrap();
        let names: Vec<&str> = second.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Short", "Shawl"]);
        assert!(second.iter().all(|p| p.category.name == "Clothing"));
    }

    #[tokio::test]
    async fn test_public_base_url_overrides_origin() {
        let temp = TempDir::new().unwrap();
        let catalog = InMemoryCatalog::new();
        let category_id = catalog.seed_category("Clothing");
        let service = ProductService::new(
            Arc::new(catalog),
            Arc::new(ImageStore::new(temp.path())),
            KeyedLock::new(),
            Some("https://cdn.example.com/".to_string()),
        );

        let created = service
            .create(fields("Shirt", 1, category_id), png(b"x"), ORIGIN)
            .await
            .unwrap();
        assert_eq!(
            created.image_url,
            format!("https://cdn.example.com/images/{}", created.image)
        );
    }

    #[tokio::test]
    async fn test_concurrent_deletes_of_same_product() {
        let f = fixture();
        let created = f
            .service
            .create(fields("Shirt", 1, f.category_id), png(b"shirt"), ORIGIN)
            .await
            .unwrap();

        let service = Arc::new(f.service);
        let a = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.delete(created.id).await }
        });
        let b = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.delete(created.id).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::NotFound(_)))));
        assert!(f.store.list().await.unwrap().is_empty());
    }
}
