//! HTTP surface: router, server loop, and request tracing layers.

use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

use handlers::auth::state::AuthState;

/// Build the application router with all routes and tracing layers.
#[must_use]
pub fn router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/v1/auth/register", post(handlers::auth::signin::register))
        .route("/v1/auth/sign-in", post(handlers::auth::signin::sign_in))
        .route(
            "/v1/auth/verify-otp",
            post(handlers::auth::otp::verify_otp),
        )
        .route(
            "/v1/auth/resend-otp",
            post(handlers::auth::otp::resend_otp),
        )
        .route(
            "/v1/auth/forgot-password",
            post(handlers::auth::password::forgot_password),
        )
        .route(
            "/v1/auth/refresh-token",
            post(handlers::auth::tokens::refresh_token),
        )
        .route(
            "/v1/auth/reset-password",
            post(handlers::auth::password::reset_password),
        )
        .route("/v1/auth/me", get(handlers::auth::me::me))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<AuthState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
