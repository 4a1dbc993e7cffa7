use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use super::jwt::{Error, TokenClaims, sign_hs256, verify_hs256};
use crate::users::User;

pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Signing secret, audience/issuer pair, and per-flavor TTLs.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    secret: SecretString,
    issuer: String,
    audience: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString, issuer: String, audience: String) -> Self {
        Self {
            secret,
            issuer,
            audience,
            access_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

/// Stateless issuer; validity of a token is fully determined by its
/// signature and expiry, nothing is stored server-side.
#[derive(Clone, Debug)]
pub struct TokenSigner {
    config: TokenConfig,
}

impl TokenSigner {
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn sign(&self, user: &User, ttl_seconds: i64, now: DateTime<Utc>) -> Result<String, Error> {
        let claims = TokenClaims {
            sub: user.id,
            email: Some(user.email.clone()),
            role: Some(user.role.clone()),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_seconds,
        };
        sign_hs256(self.config.secret.expose_secret().as_bytes(), &claims)
    }

    /// Short-lived credential proving identity for API calls.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn sign_access_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, Error> {
        self.sign(user, self.config.access_ttl_seconds, now)
    }

    /// Long-lived credential used solely to mint new access tokens.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn sign_refresh_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, Error> {
        self.sign(user, self.config.refresh_ttl_seconds, now)
    }

    /// Verify a token against this signer's secret, issuer and audience.
    ///
    /// # Errors
    /// Returns an error on bad signature, expiry, or issuer/audience mismatch.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, Error> {
        verify_hs256(
            token,
            self.config.secret.expose_secret().as_bytes(),
            &self.config.issuer,
            &self.config.audience,
            now.timestamp(),
        )
    }
}
