//! Request/response types for auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::otp::OtpDispatch;
use crate::users::UserProjection;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub mobile: Option<String>,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Dispatch receipt returned by sign-in/register/resend; never carries the
/// code itself.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpDispatchResponse {
    pub subject_id: Uuid,
    pub attempt_count: u32,
    pub expires_at: DateTime<Utc>,
}

impl From<OtpDispatch> for OtpDispatchResponse {
    fn from(dispatch: OtpDispatch) -> Self {
        Self {
            subject_id: dispatch.subject_id,
            attempt_count: dispatch.attempt_count,
            expires_at: dispatch.expires_at,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub subject_id: Uuid,
    pub code: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub user: UserProjection,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    #[serde(default)]
    pub subject_id: Option<Uuid>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Error body shape shared by every endpoint.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn register_request_mobile_is_optional() -> Result<()> {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name":"Alice","email":"alice@example.com","password":"hunter2!"}"#,
        )?;
        assert_eq!(request.mobile, None);
        Ok(())
    }

    #[test]
    fn resend_request_tolerates_missing_fields() -> Result<()> {
        let request: ResendOtpRequest = serde_json::from_str("{}")?;
        assert!(request.subject_id.is_none());
        assert!(request.email.is_none());
        Ok(())
    }

    #[test]
    fn dispatch_response_carries_no_code() -> Result<()> {
        let dispatch = OtpDispatch {
            subject_id: Uuid::new_v4(),
            attempt_count: 2,
            expires_at: Utc::now(),
        };
        let value = serde_json::to_value(OtpDispatchResponse::from(dispatch))?;
        assert!(value.get("code").is_none());
        assert!(value.get("code_hash").is_none());
        let attempts = value
            .get("attempt_count")
            .and_then(serde_json::Value::as_u64)
            .context("missing attempt_count")?;
        assert_eq!(attempts, 2);
        Ok(())
    }
}
