use anyhow::anyhow;
use chrono::Duration as ChronoDuration;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::models::{OtpDispatch, OtpRecord};
use super::store::OtpStore;
use crate::auth::AuthError;
use crate::clock::Clock;
use crate::notify::NotificationSender;
use crate::password;

pub const DEFAULT_OTP_TTL_SECONDS: i64 = 60;
const RESEND_LIMIT_PER_WINDOW: u32 = 3;
const RESEND_WINDOW_HOURS: i64 = 24;
const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug)]
pub struct OtpConfig {
    ttl_seconds: i64,
    delivery_timeout: Duration,
}

impl OtpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues, resends, and verifies one-time codes.
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    notifier: Arc<dyn NotificationSender>,
    clock: Arc<dyn Clock>,
    config: OtpConfig,
    // Keyed critical sections: issue/resend/verify for one subject never
    // interleave, so the attempt counter cannot be raced.
    subject_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl OtpService {
    #[must_use]
    pub fn new(
        store: Arc<dyn OtpStore>,
        notifier: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        config: OtpConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            config,
            subject_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn subject_lock(&self, subject_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.subject_locks.lock().await;
        Arc::clone(locks.entry(subject_id).or_default())
    }

    /// Issue a fresh code for a subject with no prior attempt history.
    ///
    /// The record is persisted before delivery: a delivery failure surfaces
    /// as `DeliveryError` but the code stays valid, and resend is the
    /// recovery path.
    ///
    /// # Errors
    /// Returns `DeliveryError`/`Timeout` on notification failure, or an
    /// internal error if hashing or persistence fails.
    pub async fn issue(&self, subject_id: Uuid, email: &str) -> Result<OtpDispatch, AuthError> {
        let lock = self.subject_lock(subject_id).await;
        let _guard = lock.lock().await;
        self.issue_locked(subject_id, email).await
    }

    /// Regenerate and redeliver the code for a subject with an existing
    /// record, enforcing the 3-per-24h issuance limit.
    ///
    /// # Errors
    /// Returns `NotFound` without a prior record, `RateLimitExceeded` once
    /// the limit is hit, and delivery errors as in [`OtpService::issue`].
    pub async fn resend(&self, subject_id: Uuid, email: &str) -> Result<OtpDispatch, AuthError> {
        let lock = self.subject_lock(subject_id).await;
        let _guard = lock.lock().await;
        self.resend_locked(subject_id, email).await
    }

    /// Resend when a record exists, issue otherwise. Entry point for
    /// sign-up and sign-in, where either state is legitimate.
    ///
    /// # Errors
    /// As [`OtpService::issue`] and [`OtpService::resend`].
    pub async fn dispatch(&self, subject_id: Uuid, email: &str) -> Result<OtpDispatch, AuthError> {
        let lock = self.subject_lock(subject_id).await;
        let _guard = lock.lock().await;
        let existing = self.store.load(subject_id).map_err(AuthError::Internal)?;
        if existing.is_some() {
            self.resend_locked(subject_id, email).await
        } else {
            self.issue_locked(subject_id, email).await
        }
    }

    /// Check a submitted code against the live record.
    ///
    /// The record is intentionally left in place on success; it stays
    /// re-checkable until it expires or the next issuance overwrites it.
    ///
    /// # Errors
    /// Returns `NotFound` without a record, `Expired` past `expires_at`,
    /// and `InvalidCode` on hash mismatch.
    pub async fn verify(&self, subject_id: Uuid, submitted_code: &str) -> Result<(), AuthError> {
        let lock = self.subject_lock(subject_id).await;
        let _guard = lock.lock().await;

        let record = self
            .store
            .load(subject_id)
            .map_err(AuthError::Internal)?
            .ok_or_else(|| {
                AuthError::NotFound("no verification code issued for this account".to_string())
            })?;

        if self.clock.now() > record.expires_at {
            return Err(AuthError::OtpExpired);
        }

        let code_matches = password::verify(submitted_code, &record.code_hash)
            .await
            .map_err(AuthError::Internal)?;
        if !code_matches {
            return Err(AuthError::InvalidOtp);
        }

        Ok(())
    }

    async fn issue_locked(&self, subject_id: Uuid, email: &str) -> Result<OtpDispatch, AuthError> {
        let code = generate_code();
        let code_hash = password::hash(&code).await.map_err(AuthError::Internal)?;
        let now = self.clock.now();

        let record = OtpRecord {
            subject_id,
            code_hash,
            attempt_count: 1,
            expires_at: now + ChronoDuration::seconds(self.config.ttl_seconds),
            last_issued_at: now,
        };
        self.store
            .save(record.clone())
            .map_err(AuthError::Internal)?;

        let dispatch = OtpDispatch::from(&record);
        self.deliver(email, code).await?;
        Ok(dispatch)
    }

    async fn resend_locked(
        &self,
        subject_id: Uuid,
        email: &str,
    ) -> Result<OtpDispatch, AuthError> {
        let existing = self
            .store
            .load(subject_id)
            .map_err(AuthError::Internal)?
            .ok_or_else(|| {
                AuthError::NotFound("no verification code issued for this account".to_string())
            })?;

        let now = self.clock.now();
        let window_elapsed =
            now - existing.last_issued_at >= ChronoDuration::hours(RESEND_WINDOW_HOURS);
        if !window_elapsed && existing.attempt_count >= RESEND_LIMIT_PER_WINDOW {
            return Err(AuthError::RateLimitExceeded(
                "one-time code limit reached; try again after 24 hours".to_string(),
            ));
        }

        let code = generate_code();
        let code_hash = password::hash(&code).await.map_err(AuthError::Internal)?;
        let record = OtpRecord {
            subject_id,
            code_hash,
            attempt_count: if window_elapsed {
                1
            } else {
                existing.attempt_count + 1
            },
            expires_at: now + ChronoDuration::seconds(self.config.ttl_seconds),
            last_issued_at: now,
        };
        self.store
            .save(record.clone())
            .map_err(AuthError::Internal)?;

        let dispatch = OtpDispatch::from(&record);
        self.deliver(email, code).await?;
        Ok(dispatch)
    }

    async fn deliver(&self, email: &str, code: String) -> Result<(), AuthError> {
        let notifier = Arc::clone(&self.notifier);
        let to = email.to_string();
        let send = tokio::task::spawn_blocking(move || notifier.send_otp(&to, &code));

        match tokio::time::timeout(self.config.delivery_timeout, send).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(err))) => Err(AuthError::Delivery(format!(
                "failed to deliver one-time code: {err}"
            ))),
            Ok(Err(err)) => Err(AuthError::Internal(anyhow!("delivery task failed: {err}"))),
            Err(_) => Err(AuthError::Timeout(
                "one-time code delivery timed out".to_string(),
            )),
        }
    }
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}
