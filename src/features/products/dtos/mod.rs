mod image_report_dto;
mod product_dto;

pub use image_report_dto::{DanglingImageDto, ImageReportDto};
pub use product_dto::{
    ListProductsQuery, ProductDetailResponseDto, ProductFieldsDto, ProductFormDto,
    ProductResponseDto,
};
