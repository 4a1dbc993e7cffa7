//! Authenticated self-service endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::guard;
use super::state::AuthState;
use crate::auth::AuthError;

/// Return the authenticated account's restricted projection.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    params(
        ("Authorization" = String, Header, description = "Bearer access token")
    ),
    responses(
        (status = 200, description = "Authenticated account profile", body = crate::users::UserProjection),
        (status = 403, description = "Missing or invalid bearer token", body = super::types::ErrorResponse),
        (status = 404, description = "Subject no longer exists", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = guard::require_auth(&headers, &state)?;
    let projection = state.auth().current_user(claims.sub)?;
    Ok((StatusCode::OK, Json(projection)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::test_support::auth_state;
    use crate::rate_limit::NoopRateLimiter;
    use anyhow::Result;
    use axum::http::HeaderValue;
    use axum::http::header::AUTHORIZATION;
    use axum::response::IntoResponse;

    fn state() -> Extension<Arc<AuthState>> {
        Extension(Arc::new(auth_state(Arc::new(NoopRateLimiter))))
    }

    #[tokio::test]
    async fn me_without_token_is_forbidden() -> Result<()> {
        let response = me(HeaderMap::new(), state()).await.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn me_with_garbage_token_is_forbidden() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer garbage"));
        let response = me(headers, state()).await.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        Ok(())
    }
}
