//! `OpenAPI` document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers::{auth, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signin::register,
        auth::signin::sign_in,
        auth::otp::verify_otp,
        auth::otp::resend_otp,
        auth::password::forgot_password,
        auth::password::reset_password,
        auth::tokens::refresh_token,
        auth::me::me,
    ),
    components(schemas(
        health::Health,
        auth::types::RegisterRequest,
        auth::types::SignInRequest,
        auth::types::OtpDispatchResponse,
        auth::types::VerifyOtpRequest,
        auth::types::VerifyOtpResponse,
        auth::types::ResendOtpRequest,
        auth::types::ForgotPasswordRequest,
        auth::types::RefreshTokenRequest,
        auth::types::RefreshTokenResponse,
        auth::types::ResetPasswordRequest,
        auth::types::ErrorResponse,
        crate::users::UserProjection,
    )),
    tags(
        (name = "auth", description = "Sign-in, OTP verification, tokens and password flows"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
