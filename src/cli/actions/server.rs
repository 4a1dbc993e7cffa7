use crate::api;
use crate::api::handlers::auth::state::AuthState;
use crate::auth::AuthService;
use crate::cli::actions::Action;
use crate::clock::{Clock, SystemClock};
use crate::notify::{LogNotificationSender, NotificationSender};
use crate::otp::{InMemoryOtpStore, OtpConfig, OtpService, OtpStore};
use crate::rate_limit::{AdaptiveRateLimiter, InMemoryTrackerStore, RateLimiter, TrackerStore};
use crate::token::{TokenConfig, TokenSigner};
use crate::users::{InMemoryUserStore, UserStore};
use anyhow::Result;
use std::sync::Arc;

/// Wire the in-memory collaborators and start the API server.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            token_secret,
            token_issuer,
            token_audience,
            access_token_ttl,
            refresh_token_ttl,
            otp_ttl,
        } => {
            let clock: Arc<dyn Clock> = Arc::new(SystemClock);
            let notifier: Arc<dyn NotificationSender> = Arc::new(LogNotificationSender);
            let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());

            let otp = Arc::new(OtpService::new(
                Arc::new(InMemoryOtpStore::new()) as Arc<dyn OtpStore>,
                Arc::clone(&notifier),
                Arc::clone(&clock),
                OtpConfig::new().with_ttl_seconds(otp_ttl),
            ));

            let signer = TokenSigner::new(
                TokenConfig::new(token_secret, token_issuer, token_audience)
                    .with_access_ttl_seconds(access_token_ttl)
                    .with_refresh_ttl_seconds(refresh_token_ttl),
            );

            let limiter: Arc<dyn RateLimiter> = Arc::new(AdaptiveRateLimiter::new(
                Arc::new(InMemoryTrackerStore::new()) as Arc<dyn TrackerStore>,
                Arc::clone(&clock),
            ));

            let auth = AuthService::new(users, otp, signer, notifier, clock);
            let state = Arc::new(AuthState::new(auth, limiter));

            api::new(port, state).await?;
        }
    }

    Ok(())
}
