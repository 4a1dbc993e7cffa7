//! Bearer-token request gate for protected endpoints.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use super::state::AuthState;
use crate::auth::AuthError;
use crate::token::TokenClaims;

/// Extract and verify the bearer token, yielding the authenticated claims.
///
/// # Errors
/// `Forbidden` when the header is missing, not a bearer scheme, or the
/// token fails verification.
pub(super) fn require_auth(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<TokenClaims, AuthError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AuthError::Forbidden("missing bearer token".to_string()))?;
    state.auth().authenticate(token)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            if scheme.eq_ignore_ascii_case("bearer") {
                Some(token.trim())
            } else {
                None
            }
        })
        .filter(|token| !token.is_empty())
}
