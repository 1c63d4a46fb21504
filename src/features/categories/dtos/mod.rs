mod category_dto;

pub use category_dto::{
    CategoryListResponseDto, CategoryResponseDto, CategorySummaryDto, ListCategoriesQuery,
    UpsertCategoryDto,
};
