use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::database::{contains_pattern, is_foreign_key_violation};
use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

/// Persistence for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Categories whose name contains `name_filter`, ordered by name
    async fn list(&self, name_filter: &str) -> Result<Vec<Category>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>>;

    async fn create(&self, name: &str) -> Result<Category>;

    /// Rename a category. `None` when no row has this id.
    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>>;

    /// Delete a category. `false` when no row has this id,
    /// `AppError::Conflict` while products still reference it.
    async fn delete(&self, id: i32) -> Result<bool>;
}

/// PostgreSQL-backed category repository
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, name_filter: &str) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE name LIKE $1 ESCAPE '\'
            ORDER BY name ASC, id ASC
            "#,
        )
        .bind(contains_pattern(name_filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::Conflict(format!(
                "Category {} still has products and cannot be deleted",
                id
            ))),
            Err(e) => {
                tracing::error!("Failed to delete category: {:?}", e);
                Err(AppError::Database(e))
            }
        }
    }
}
