use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::AuthError;
use crate::clock::Clock;
use crate::notify::NotificationSender;
use crate::otp::{OtpDispatch, OtpService};
use crate::password;
use crate::token::{TokenClaims, TokenSigner};
use crate::users::{User, UserProjection, UserStore, UserUpdate};

/// Access and refresh tokens minted together after OTP verification.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of a successful OTP verification.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub user: UserProjection,
    pub tokens: TokenPair,
}

/// Composes the collaborators into the sign-in, verification, refresh and
/// password flows. Holds no mutable state of its own.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    otp: Arc<OtpService>,
    signer: TokenSigner,
    notifier: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        otp: Arc<OtpService>,
        signer: TokenSigner,
        notifier: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            otp,
            signer,
            notifier,
            clock,
        }
    }

    /// Create an unverified account and send its first one-time code.
    ///
    /// # Errors
    /// Returns `BadRequest` when the email is already registered, plus any
    /// hashing, persistence, or delivery error.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        mobile: Option<String>,
        plaintext_password: &str,
    ) -> Result<OtpDispatch, AuthError> {
        if self.users.find_by_email(email)?.is_some() {
            return Err(AuthError::BadRequest(
                "email is already registered".to_string(),
            ));
        }

        let password_hash = password::hash(plaintext_password).await?;
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            mobile,
            password_hash,
            verified: false,
            role: "user".to_string(),
        };
        let subject_id = user.id;
        self.users.save(user)?;
        info!(%subject_id, "registered new account");

        self.otp.issue(subject_id, email).await
    }

    /// Check credentials and dispatch a one-time code.
    ///
    /// Full authentication completes only after OTP verification; this
    /// returns the dispatch status, never tokens.
    ///
    /// # Errors
    /// `NotFound` for an unknown email, `NotVerified` for an account that
    /// never completed verification, `Unauthorized` on password mismatch,
    /// `Timeout` when the hash comparison itself fails.
    pub async fn sign_in(
        &self,
        email: &str,
        plaintext_password: &str,
    ) -> Result<OtpDispatch, AuthError> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("no account for this email".to_string()))?;

        if !user.verified {
            return Err(AuthError::NotVerified);
        }

        let password_matches = password::verify(plaintext_password, &user.password_hash)
            .await
            .map_err(|err| AuthError::Timeout(format!("password comparison failed: {err}")))?;
        if !password_matches {
            return Err(AuthError::Unauthorized("invalid credentials".to_string()));
        }

        self.otp.dispatch(user.id, &user.email).await
    }

    /// Redeliver the live one-time code for a subject.
    ///
    /// The code always goes to the account's stored email; the supplied
    /// address must match it.
    ///
    /// # Errors
    /// `NotFound` when the subject or email does not match an account, plus
    /// the OTP resend errors.
    pub async fn resend_otp(
        &self,
        subject_id: Uuid,
        email: &str,
    ) -> Result<OtpDispatch, AuthError> {
        let user = self
            .users
            .find_by_id(subject_id)?
            .filter(|user| user.email == email)
            .ok_or_else(|| {
                AuthError::NotFound("no account matching this subject and email".to_string())
            })?;

        self.otp.resend(user.id, &user.email).await
    }

    /// Check a submitted code, mark the account verified, and mint the
    /// access/refresh token pair.
    ///
    /// The welcome notification is best-effort; its failure never rolls
    /// back verification.
    ///
    /// # Errors
    /// `NotFound` for an unknown subject, plus the OTP verify errors and
    /// signing failures.
    pub async fn verify_otp(
        &self,
        subject_id: Uuid,
        code: &str,
    ) -> Result<VerifiedSession, AuthError> {
        let user = self
            .users
            .find_by_id(subject_id)?
            .ok_or_else(|| AuthError::NotFound("no account for this subject".to_string()))?;

        self.otp.verify(subject_id, code).await?;

        let user = if user.verified {
            user
        } else {
            let updated = self
                .users
                .update(subject_id, UserUpdate::verified(true))?
                .ok_or_else(|| AuthError::NotFound("no account for this subject".to_string()))?;
            if let Err(err) = self.notifier.send_welcome(&updated.email) {
                warn!(%subject_id, "welcome notification failed: {err}");
            }
            updated
        };

        let tokens = self.mint_token_pair(&user, self.clock.now())?;
        Ok(VerifiedSession {
            user: UserProjection::from(&user),
            tokens,
        })
    }

    /// Mint a fresh access token from a refresh token.
    ///
    /// The subject is re-resolved so the new token carries current email
    /// and role rather than the stale claims. Refresh tokens are never
    /// rotated here.
    ///
    /// # Errors
    /// `Forbidden` when the token is invalid, expired, or its subject no
    /// longer exists.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let claims = self
            .signer
            .verify(refresh_token, now)
            .map_err(|_| AuthError::Forbidden("invalid refresh token".to_string()))?;

        let user = self
            .users
            .find_by_id(claims.sub)?
            .ok_or_else(|| AuthError::Forbidden("invalid refresh token".to_string()))?;

        self.signer
            .sign_access_token(&user, now)
            .map_err(|err| AuthError::Internal(err.into()))
    }

    /// Start a password reset by redelivering the account's one-time code.
    ///
    /// # Errors
    /// `NotFound` for an unknown email, plus the OTP resend errors.
    pub async fn forgot_password(&self, email: &str) -> Result<OtpDispatch, AuthError> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or_else(|| AuthError::NotFound("no account for this email".to_string()))?;

        self.otp.resend(user.id, &user.email).await
    }

    /// Replace the stored password after re-proving the old one.
    ///
    /// # Errors
    /// `Unauthorized` when the old password does not match, `BadRequest`
    /// when the confirmation differs from the new password.
    pub async fn reset_password(
        &self,
        subject_id: Uuid,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<UserProjection, AuthError> {
        let user = self
            .users
            .find_by_id(subject_id)?
            .ok_or_else(|| AuthError::NotFound("no account for this subject".to_string()))?;

        let old_matches = password::verify(old_password, &user.password_hash).await?;
        if !old_matches {
            return Err(AuthError::Unauthorized(
                "old password does not match".to_string(),
            ));
        }

        if new_password != confirm_password {
            return Err(AuthError::BadRequest(
                "password confirmation does not match".to_string(),
            ));
        }

        let password_hash = password::hash(new_password).await?;
        let updated = self
            .users
            .update(subject_id, UserUpdate::password_hash(password_hash))?
            .ok_or_else(|| AuthError::NotFound("no account for this subject".to_string()))?;
        info!(%subject_id, "password reset");

        Ok(UserProjection::from(&updated))
    }

    /// Restricted projection of the account; never exposes the password
    /// hash or OTP material.
    ///
    /// # Errors
    /// `NotFound` for an unknown subject.
    pub fn current_user(&self, subject_id: Uuid) -> Result<UserProjection, AuthError> {
        let user = self
            .users
            .find_by_id(subject_id)?
            .ok_or_else(|| AuthError::NotFound("no account for this subject".to_string()))?;
        Ok(UserProjection::from(&user))
    }

    /// Validate a bearer token for the request gate.
    ///
    /// # Errors
    /// `Forbidden` on any signature, expiry, issuer, or audience failure.
    pub fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.signer
            .verify(token, self.clock.now())
            .map_err(|_| AuthError::Forbidden("invalid or expired token".to_string()))
    }

    fn mint_token_pair(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let access_token = self
            .signer
            .sign_access_token(user, now)
            .map_err(|err| AuthError::Internal(err.into()))?;
        let refresh_token = self
            .signer
            .sign_refresh_token(user, now)
            .map_err(|err| AuthError::Internal(err.into()))?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
