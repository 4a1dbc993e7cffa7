//! Token refresh endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::state::AuthState;
use super::types::{RefreshTokenRequest, RefreshTokenResponse};
use crate::auth::AuthError;

/// Mint a fresh access token from a refresh token. The refresh token itself
/// is not rotated.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshTokenResponse),
        (status = 403, description = "Invalid or expired refresh token", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshTokenRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) =
        payload.ok_or_else(|| AuthError::BadRequest("missing payload".to_string()))?;

    if request.refresh_token.trim().is_empty() {
        return Err(AuthError::BadRequest("missing refresh token".to_string()));
    }

    let access_token = state.auth().refresh_tokens(&request.refresh_token).await?;
    Ok((StatusCode::OK, Json(RefreshTokenResponse { access_token })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::test_support::auth_state;
    use crate::rate_limit::NoopRateLimiter;
    use anyhow::Result;
    use axum::response::IntoResponse;

    fn state() -> Extension<Arc<AuthState>> {
        Extension(Arc::new(auth_state(Arc::new(NoopRateLimiter))))
    }

    #[tokio::test]
    async fn refresh_missing_payload() -> Result<()> {
        let response = refresh_token(state(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_token() -> Result<()> {
        let response = refresh_token(
            state(),
            Some(Json(RefreshTokenRequest {
                refresh_token: "not-a-token".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        Ok(())
    }
}
