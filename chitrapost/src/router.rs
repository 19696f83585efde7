//! Route table
//!
//! ```text
//! POST /api/users/register   2 MiB body limit
//! POST /api/users/login      2 MiB body limit
//! POST /api/uploads          10 MiB body limit, bearer token
//! GET  /api/healthcheck      bearer token
//! ```
//!
//! Every response carries `X-Content-Type-Options: nosniff`,
//! `X-Frame-Options: SAMEORIGIN` and `X-XSS-Protection: 1; mode=block`, and
//! every request is traced.

use crate::handlers::{health, uploads, users};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

const X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");

/// Build the application router
///
/// # Example
///
/// ```rust,no_run
/// # use chitrapost::{router, state::AppState};
/// # async fn example(state: AppState) -> anyhow::Result<()> {
/// let address = state.config().server.bind_address();
/// let listener = tokio::net::TcpListener::bind(address).await?;
/// axum::serve(listener, router::router(state)).await?;
/// # Ok(())
/// # }
/// ```
pub fn router(state: AppState) -> Router {
    let limits = &state.config().server;

    let users = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .layer(DefaultBodyLimit::max(limits.users_body_limit_bytes));

    let api = Router::new()
        .nest("/users", users)
        .route(
            "/uploads",
            post(uploads::create).layer(DefaultBodyLimit::max(limits.upload_body_limit_bytes)),
        )
        .route("/healthcheck", get(health::healthcheck));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    X_XSS_PROTECTION,
                    HeaderValue::from_static("1; mode=block"),
                )),
        )
        .with_state(state)
}
