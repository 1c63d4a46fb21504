//! In-memory stand-ins for the PostgreSQL repositories, used by unit and
//! router tests. Mirrors the constraints the schema enforces: products need an
//! existing category, and categories with products cannot be deleted.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::categories::CategoryRepository;
use crate::features::products::models::{
    ImageReference, Product, ProductRecord, ProductWithCategory,
};
use crate::features::products::ProductRepository;

#[derive(Default)]
struct CatalogState {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_category_id: i32,
    next_product_id: i32,
    fail_product_writes: bool,
    fail_reference_checks: bool,
}

impl CatalogState {
    fn category_name(&self, id: i32) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn with_category(&self, product: &Product) -> Option<ProductWithCategory> {
        self.category_name(product.category_id)
            .map(|category_name| ProductWithCategory {
                product: product.clone(),
                category_name,
            })
    }

    fn check_product_write(&self, record: &ProductRecord) -> Result<()> {
        if self.fail_product_writes {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        if self.category_name(record.category_id).is_none() {
            return Err(AppError::UnprocessableEntity(format!(
                "Category {} does not exist",
                record.category_id
            )));
        }
        Ok(())
    }
}

/// Shared in-memory catalog implementing both repositories
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap()
    }

    pub fn category_count(&self) -> usize {
        self.state().categories.len()
    }

    pub fn product_count(&self) -> usize {
        self.state().products.len()
    }

    pub fn seed_category(&self, name: &str) -> i32 {
        let mut state = self.state();
        state.next_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: state.next_category_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.categories.push(category);
        state.next_category_id
    }

    /// Insert a product row directly, without touching any image store
    pub fn seed_product(&self, name: &str, category_id: i32, image: &str) -> i32 {
        let mut state = self.state();
        state.next_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: state.next_product_id,
            name: name.to_string(),
            price: Decimal::ONE,
            image: image.to_string(),
            image_url: format!("http://localhost/images/{}", image),
            category_id,
            created_at: now,
            updated_at: now,
        };
        state.products.push(product);
        state.next_product_id
    }

    /// Make product inserts and updates fail with a database error
    pub fn fail_product_writes(&self, fail: bool) {
        self.state().fail_product_writes = fail;
    }

    /// Make `count_image_references` fail with a database error
    pub fn fail_reference_checks(&self, fail: bool) {
        self.state().fail_reference_checks = fail;
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalog {
    async fn list(&self, name_filter: &str) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .state()
            .categories
            .iter()
            .filter(|c| c.name.contains(name_filter))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>> {
        Ok(self.state().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, name: &str) -> Result<Category> {
        let id = self.seed_category(name);
        self.state()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::Internal("seeded category vanished".to_string()))
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>> {
        let mut state = self.state();
        Ok(state.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.name = name.to_string();
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut state = self.state();
        if state.products.iter().any(|p| p.category_id == id) {
            return Err(AppError::Conflict(format!(
                "Category {} still has products and cannot be deleted",
                id
            )));
        }
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn list(
        &self,
        name_filter: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductWithCategory>> {
        let state = self.state();
        let mut products: Vec<&Product> = state
            .products
            .iter()
            .filter(|p| p.name.contains(name_filter))
            .collect();
        products.sort_by_key(|p| p.id);

        Ok(products
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .filter_map(|p| state.with_category(p))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>> {
        let state = self.state();
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| state.with_category(p)))
    }

    async fn get(&self, id: i32) -> Result<Option<Product>> {
        Ok(self.state().products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, record: &ProductRecord) -> Result<Product> {
        let mut state = self.state();
        state.check_product_write(record)?;

        state.next_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: state.next_product_id,
            name: record.name.clone(),
            price: record.price,
            image: record.image.clone(),
            image_url: record.image_url.clone(),
            category_id: record.category_id,
            created_at: now,
            updated_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: i32, record: &ProductRecord) -> Result<Option<Product>> {
        let mut state = self.state();
        state.check_product_write(record)?;

        Ok(state.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.name = record.name.clone();
            p.price = record.price;
            p.image = record.image.clone();
            p.image_url = record.image_url.clone();
            p.category_id = record.category_id;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        let mut state = self.state();
        let position = state.products.iter().position(|p| p.id == id);
        Ok(position.map(|i| state.products.remove(i)))
    }

    async fn count_image_references(&self, image: &str) -> Result<i64> {
        let state = self.state();
        if state.fail_reference_checks {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(state
            .products
            .iter()
            .filter(|p| p.image == image)
            .count() as i64)
    }

    async fn list_image_references(&self) -> Result<Vec<ImageReference>> {
        let mut references: Vec<ImageReference> = self
            .state()
            .products
            .iter()
            .map(|p| ImageReference {
                product_id: p.id,
                image: p.image.clone(),
            })
            .collect();
        references.sort_by_key(|r| r.product_id);
        Ok(references)
    }
}
