use std::str::FromStr;

use axum::{
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Form, Json,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::products::dtos::ProductFieldsDto;
use crate::features::products::models::ImageUpload;
use crate::shared::constants::MAX_UPLOAD_BODY_SIZE;

/// Body of a product create or update request.
///
/// Accepts `multipart/form-data` (the only way to send an image),
/// `application/json` and `application/x-www-form-urlencoded`.
/// An update with an empty body changes nothing but the image URL.
#[derive(Debug, Default)]
pub struct ProductPayload {
    pub fields: ProductFieldsDto,
    pub image: Option<ImageUpload>,
}

impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                read_multipart(multipart).await
            }
            Some(ct) if ct.starts_with("application/json") => {
                let Json(fields) = Json::<ProductFieldsDto>::from_request(req, state)
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(format!("Invalid JSON body: {}", e.body_text()))
                    })?;
                Ok(Self {
                    fields,
                    image: None,
                })
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(fields) = Form::<ProductFieldsDto>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                Ok(Self {
                    fields,
                    image: None,
                })
            }
            Some(ct) => Err(AppError::BadRequest(format!(
                "Unsupported content type: {}",
                ct
            ))),
            None => Ok(Self::default()),
        }
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::FileTooLarge(MAX_UPLOAD_BODY_SIZE);
    }
    debug!("Failed to read multipart field: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductPayload, AppError> {
    let mut payload = ProductPayload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;

                // An empty file input still sends a part with no name and no content
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                payload.image = Some(ImageUpload::new(file_name, data));
            }
            "name" => payload.fields.name = text_field(field).await?,
            "price" => {
                payload.fields.price = text_field(field)
                    .await?
                    .map(|v| parse_field::<Decimal>("price", &v))
                    .transpose()?;
            }
            "categoryId" => {
                payload.fields.category_id = text_field(field)
                    .await?
                    .map(|v| parse_field::<i32>("categoryId", &v))
                    .transpose()?;
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    Ok(payload)
}

/// Text value of a form field, `None` when blank
async fn text_field(field: Field<'_>) -> Result<Option<String>, AppError> {
    let text = field.text().await.map_err(multipart_error)?;
    Ok(if text.trim().is_empty() {
        None
    } else {
        Some(text)
    })
}

fn parse_field<T: FromStr>(name: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid value for {}: '{}'", name, value)))
}
