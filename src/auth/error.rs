use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy shared by every auth flow.
///
/// Each variant maps to exactly one HTTP status and a stable machine
/// readable kind, so handlers never pattern-match errors themselves.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("account is not verified")]
    NotVerified,
    #[error("one-time code has expired")]
    OtpExpired,
    #[error("one-time code does not match")]
    InvalidOtp,
    #[error("{0}")]
    RateLimitExceeded(String),
    #[error("too many requests from this client, blocked until {until}")]
    Blocked { until: DateTime<Utc> },
    #[error("{0}")]
    Delivery(String),
    #[error("{0}")]
    Timeout(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotVerified => "not_verified",
            Self::OtpExpired => "otp_expired",
            Self::InvalidOtp => "invalid_code",
            Self::RateLimitExceeded(_) => "rate_limit_exceeded",
            Self::Blocked { .. } => "blocked",
            Self::Delivery(_) => "delivery_error",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::OtpExpired | Self::InvalidOtp => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::NotVerified => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded(_) | Self::Blocked { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal details are logged, never sent over the wire.
        let message = if let Self::Internal(err) = &self {
            error!("internal auth error: {err:#}");
            "internal error".to_string()
        } else {
            self.to_string()
        };

        (
            self.status(),
            Json(json!({
                "error": self.kind(),
                "message": message,
            })),
        )
            .into_response()
    }
}
