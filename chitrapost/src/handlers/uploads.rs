//! Image upload handler

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::UploadRecord;
use crate::upload::ImageUpload;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Response for a completed upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// The new record
    pub upload: UploadRecord,
}

/// Accept one JPEG or PNG in the multipart field `file`
///
/// # Errors
///
/// 401 for a bad token or deleted account, 400 for a missing file or
/// unsupported content, 413 when over the body limit, 500 when the provider
/// or store fails.
///
/// # Example
///
/// ```bash
/// curl -H "Authorization: Bearer $TOKEN" -F file=@photo.png /api/uploads
/// ```
///
/// Response (201):
/// ```json
/// {"upload": {"id": 1, "url": "https://...", "owner_id": 1, "created_at": "..."}}
/// ```
pub async fn create(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    file: ImageUpload,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let upload = state.uploads().upload(&claims, file).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { upload })))
}
