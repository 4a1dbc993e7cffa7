//! One-time-code verification and redelivery endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::state::AuthState;
use super::throttle;
use super::types::{OtpDispatchResponse, ResendOtpRequest, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::{normalize_email, valid_email};
use crate::auth::AuthError;

/// Verify the submitted code; success marks the account verified and mints
/// the access/refresh token pair.
#[utoipa::path(
    post,
    path = "/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Code accepted, tokens issued", body = VerifyOtpResponse),
        (status = 400, description = "Wrong or expired code", body = super::types::ErrorResponse),
        (status = 404, description = "Unknown subject or no code issued", body = super::types::ErrorResponse),
        (status = 429, description = "Client is blocked", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    throttle::check(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    let code = request.code.trim();
    if code.is_empty() {
        return Err(AuthError::BadRequest("missing code".to_string()));
    }

    let session = state.auth().verify_otp(request.subject_id, code).await?;
    Ok((
        StatusCode::OK,
        Json(VerifyOtpResponse {
            user: session.user,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }),
    ))
}

/// Regenerate and redeliver the live code for a subject.
#[utoipa::path(
    post,
    path = "/v1/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Code redelivered", body = OtpDispatchResponse),
        (status = 400, description = "Missing subject or email", body = super::types::ErrorResponse),
        (status = 404, description = "No matching account or code", body = super::types::ErrorResponse),
        (status = 429, description = "Resend limit reached or client blocked", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn resend_otp(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    throttle::check(&headers, &state)?;

    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    let (Some(subject_id), Some(email)) = (request.subject_id, request.email) else {
        return Err(AuthError::BadRequest(
            "both subject_id and email are required".to_string(),
        ));
    };

    let email = normalize_email(&email);
    if !valid_email(&email) {
        return Err(AuthError::BadRequest("invalid email".to_string()));
    }

    let dispatch = state.auth().resend_otp(subject_id, &email).await?;
    Ok((StatusCode::OK, Json(OtpDispatchResponse::from(dispatch))))
}
