//! Per-(IP, device) throttling applied before the auth flows run.

use axum::http::HeaderMap;
use tracing::warn;

use super::state::AuthState;
use super::utils::{extract_client_ip, extract_device_id};
use crate::auth::AuthError;
use crate::rate_limit::RateLimitDecision;

/// Consult the adaptive limiter for this client; enforced before any
/// credential or OTP work to avoid amplification.
///
/// # Errors
/// `Blocked` once the client tracker is over its window budget.
pub(super) fn check(headers: &HeaderMap, state: &AuthState) -> Result<(), AuthError> {
    let ip = extract_client_ip(headers);
    let device = extract_device_id(headers);

    match state
        .rate_limiter()
        .check(ip.as_deref(), device.as_deref())
    {
        RateLimitDecision::Allowed => Ok(()),
        RateLimitDecision::Blocked { until } => {
            warn!("client blocked until {until}");
            Err(AuthError::Blocked { until })
        }
    }
}
