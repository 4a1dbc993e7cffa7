//! Shared auth state injected into handlers.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::rate_limit::RateLimiter;

pub struct AuthState {
    auth: AuthService,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(auth: AuthService, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self { auth, rate_limiter }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
