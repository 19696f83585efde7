//! Registration and login handlers

use crate::auth::AccountId;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::state::AppState;
use crate::validation::Credentials;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Response for registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredResponse {
    /// New account ID
    pub id: AccountId,
    /// Normalised email
    pub email: String,
}

/// Response for login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed session token
    pub token: String,
}

/// Create an account
///
/// # Errors
///
/// 400 for validation failures and duplicate emails, 500 otherwise.
///
/// # Example
///
/// ```bash
/// POST /api/users/register
/// {"email": "a@x.com", "password": "secret1"}
/// ```
///
/// Response (201):
/// ```json
/// {"id": 1, "email": "a@x.com"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let account = state.accounts().register(credentials).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            id: account.id,
            email: account.email.into(),
        }),
    ))
}

/// Exchange credentials for a token
///
/// # Errors
///
/// 400 for validation failures, 401 `{"error":"invalid credentials"}` for an
/// unknown email or wrong password, 500 otherwise.
///
/// # Example
///
/// ```bash
/// POST /api/users/login
/// {"email": "a@x.com", "password": "secret1"}
/// ```
///
/// Response (200):
/// ```json
/// {"token": "eyJ..."}
/// ```
pub async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.accounts().login(credentials).await?;
    Ok(Json(TokenResponse { token }))
}
