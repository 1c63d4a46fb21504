use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::database::{contains_pattern, is_foreign_key_violation};
use crate::core::error::{AppError, Result};
use crate::features::products::models::{
    ImageReference, Product, ProductRecord, ProductWithCategory,
};

/// Persistence for products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// One page of products whose name contains `name_filter`, ordered by id
    async fn list(
        &self,
        name_filter: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductWithCategory>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>>;

    /// The bare product row
    async fn get(&self, id: i32) -> Result<Option<Product>>;

    /// Insert a product. A missing category is `AppError::UnprocessableEntity`.
    async fn create(&self, record: &ProductRecord) -> Result<Product>;

    /// Overwrite a product. `None` when no row has this id.
    async fn update(&self, id: i32, record: &ProductRecord) -> Result<Option<Product>>;

    /// Delete a product, returning the removed row
    async fn delete(&self, id: i32) -> Result<Option<Product>>;

    /// Number of products whose image is `image`
    async fn count_image_references(&self, image: &str) -> Result<i64>;

    /// Every (product id, image) pair
    async fn list_image_references(&self) -> Result<Vec<ImageReference>>;
}

/// PostgreSQL-backed product repository
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, record: &ProductRecord, action: &str) -> AppError {
    if is_foreign_key_violation(&e) {
        return AppError::UnprocessableEntity(format!(
            "Category {} does not exist",
            record.category_id
        ));
    }
    tracing::error!("Failed to {} product: {:?}", action, e);
    AppError::Database(e)
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(
        &self,
        name_filter: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ProductWithCategory>> {
        sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.name, p.price, p.image, p.image_url, p.category_id,
                   p.created_at, p.updated_at, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.name LIKE $1 ESCAPE '\'
            ORDER BY p.id ASC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(contains_pattern(name_filter))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list products: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>> {
        sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.name, p.price, p.image, p.image_url, p.category_id,
                   p.created_at, p.updated_at, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get(&self, id: i32) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, image, image_url, category_id, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, record: &ProductRecord) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, image, image_url, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, price, image, image_url, category_id, created_at, updated_at
            "#,
        )
        .bind(&record.name)
        .bind(record.price)
        .bind(&record.image)
        .bind(&record.image_url)
        .bind(record.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, record, "create"))
    }

    async fn update(&self, id: i32, record: &ProductRecord) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, price = $3, image = $4, image_url = $5, category_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price, image, image_url, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&record.name)
        .bind(record.price)
        .bind(&record.image)
        .bind(&record.image_url)
        .bind(record.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, record, "update"))
    }

    async fn delete(&self, id: i32) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, price, image, image_url, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete product: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_image_references(&self, image: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE image = $1")
            .bind(image)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count image references: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_image_references(&self) -> Result<Vec<ImageReference>> {
        sqlx::query_as::<_, ImageReference>(
            "SELECT id AS product_id, image FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list image references: {:?}", e);
            AppError::Database(e)
        })
    }
}
