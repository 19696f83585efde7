//! Multipart image extractor
//!
//! Buffers the `file` field of a `multipart/form-data` body. The route's
//! body limit applies while reading; exceeding it is reported as 413.
//! Content is not inspected here.
//!
//! # Example
//!
//! ```rust,no_run
//! use chitrapost::upload::ImageUpload;
//!
//! async fn upload(file: ImageUpload) -> String {
//!     format!("received {} bytes", file.bytes.len())
//! }
//! ```

use crate::error::ApiError;
use crate::upload::ImageUpload;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};

/// Name of the multipart field carrying the image
pub const FILE_FIELD: &str = "file";

fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
    }
}

impl<S> FromRequest<S> for ImageUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field.file_name().map(ToString::to_string);
            let declared_type = field.content_type().map(ToString::to_string);
            let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;

            return Ok(Self {
                bytes,
                file_name,
                declared_type,
            });
        }

        Err(ApiError::BadRequest(format!("{FILE_FIELD} is required")))
    }
}
