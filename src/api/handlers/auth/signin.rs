//! Registration and sign-in endpoints.
//!
//! Both finish by dispatching a one-time code; tokens are only minted once
//! the code is verified.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::state::AuthState;
use super::throttle;
use super::types::{OtpDispatchResponse, RegisterRequest, SignInRequest};
use super::utils::{normalize_email, valid_email};
use crate::auth::AuthError;

/// Create an unverified account and dispatch its first one-time code.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, one-time code dispatched", body = OtpDispatchResponse),
        (status = 400, description = "Invalid payload or duplicate email", body = super::types::ErrorResponse),
        (status = 429, description = "Client is blocked", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    throttle::check(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::BadRequest("invalid email".to_string()));
    }
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AuthError::BadRequest("missing name".to_string()));
    }
    if request.password.is_empty() {
        return Err(AuthError::BadRequest("missing password".to_string()));
    }

    let dispatch = state
        .auth()
        .register(name, &email, request.mobile, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OtpDispatchResponse::from(dispatch)),
    ))
}

/// Check credentials and dispatch a one-time code.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Credentials accepted, one-time code dispatched", body = OtpDispatchResponse),
        (status = 401, description = "Invalid credentials", body = super::types::ErrorResponse),
        (status = 403, description = "Account not verified", body = super::types::ErrorResponse),
        (status = 404, description = "Unknown email", body = super::types::ErrorResponse),
        (status = 429, description = "Client is blocked or resend limit reached", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<SignInRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    throttle::check(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::BadRequest("invalid email".to_string()));
    }

    let dispatch = state.auth().sign_in(&email, &request.password).await?;
    Ok((StatusCode::OK, Json(OtpDispatchResponse::from(dispatch))))
}
