use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryListResponseDto, CategoryResponseDto, UpsertCategoryDto,
};
use crate::features::categories::repositories::CategoryRepository;

/// Service for category operations
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    /// List categories whose name contains `name_filter`, ordered by name
    pub async fn list(&self, name_filter: Option<&str>) -> Result<CategoryListResponseDto> {
        let categories = self.repository.list(name_filter.unwrap_or("")).await?;
        let dtos: Vec<CategoryResponseDto> = categories.into_iter().map(Into::into).collect();
        Ok(dtos.into())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<CategoryResponseDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(AppError::no_data_found)
    }

    pub async fn create(&self, dto: UpsertCategoryDto) -> Result<CategoryResponseDto> {
        let category = self.repository.create(dto.name.trim()).await?;

        tracing::info!("Category created: id={}, name={}", category.id, category.name);

        Ok(category.into())
    }

    /// Rename a category, the existence check and the write are one statement
    pub async fn update(&self, id: i32, dto: UpsertCategoryDto) -> Result<CategoryResponseDto> {
        let category = self
            .repository
            .update(id, dto.name.trim())
            .await?
            .ok_or_else(AppError::no_data_found)?;

        tracing::info!("Category updated: id={}, name={}", category.id, category.name);

        Ok(category.into())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::no_data_found());
        }

        tracing::info!("Category deleted: id={}", id);

        Ok(())
    }
}
