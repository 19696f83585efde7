//! Authentication extractor for Axum handlers
//!
//! # Example
//!
//! ```rust,no_run
//! use chitrapost::auth::Authenticated;
//!
//! async fn protected_handler(Authenticated(claims): Authenticated) -> String {
//!     format!("Hello, {}!", claims.email)
//! }
//! ```

use crate::auth::token::{AuthFailure, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

/// Verified bearer token claims
///
/// Rejects with `401 {"error":"invalid credentials"}` when the
/// `Authorization` header is missing, not a bearer credential, badly signed
/// or expired. The account itself is not looked up here.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthFailure::Malformed)?;

        let claims = app_state.tokens().verify_bearer(header)?;
        Ok(Self(claims))
    }
}
