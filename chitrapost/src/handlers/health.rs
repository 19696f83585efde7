//! Authenticated healthcheck

use crate::auth::Authenticated;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Healthcheck body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Configured environment name
    pub environment: String,
}

/// Report the configured environment to an authenticated caller
pub async fn healthcheck(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        environment: state.config().environment.clone(),
    })
}
