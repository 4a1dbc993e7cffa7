//! Password recovery and reset endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::guard;
use super::state::AuthState;
use super::throttle;
use super::types::{ForgotPasswordRequest, OtpDispatchResponse, ResetPasswordRequest};
use super::utils::{normalize_email, valid_email};
use crate::auth::AuthError;

/// Start password recovery by redelivering the account's one-time code.
#[utoipa::path(
    post,
    path = "/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Recovery code dispatched", body = OtpDispatchResponse),
        (status = 404, description = "Unknown email or no code issued", body = super::types::ErrorResponse),
        (status = 429, description = "Resend limit reached or client blocked", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    throttle::check(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::BadRequest("invalid email".to_string()));
    }

    let dispatch = state.auth().forgot_password(&email).await?;
    Ok((StatusCode::OK, Json(OtpDispatchResponse::from(dispatch))))
}

/// Replace the stored password after re-proving the old one. Requires a
/// valid bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    params(
        ("Authorization" = String, Header, description = "Bearer access token")
    ),
    responses(
        (status = 200, description = "Password replaced", body = crate::users::UserProjection),
        (status = 400, description = "Confirmation mismatch", body = super::types::ErrorResponse),
        (status = 401, description = "Old password does not match", body = super::types::ErrorResponse),
        (status = 403, description = "Missing or invalid bearer token", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = guard::require_auth(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    if request.new_password.is_empty() {
        return Err(AuthError::BadRequest("missing new password".to_string()));
    }

    let projection = state
        .auth()
        .reset_password(
            claims.sub,
            &request.old_password,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;

    Ok((StatusCode::OK, Json(projection)))
}
