//! Outbound notification abstraction.
//!
//! The core only observes success or failure of a delivery; transport
//! (SMTP, SMS gateway, API) is the sender's concern. The default sender for
//! local dev is `LogNotificationSender`, which logs and returns `Ok(())`.

use anyhow::Result;
use tracing::info;

/// Delivery abstraction for OTP and welcome notifications.
pub trait NotificationSender: Send + Sync {
    /// Deliver a one-time code or return an error to mark the send as failed.
    fn send_otp(&self, to: &str, code: &str) -> Result<()>;

    /// Deliver a post-verification welcome message.
    fn send_welcome(&self, to: &str) -> Result<()>;
}

/// Local dev sender that logs instead of sending real mail or SMS.
#[derive(Clone, Debug)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        info!(to = %to, code = %code, "otp notification send stub");
        Ok(())
    }

    fn send_welcome(&self, to: &str) -> Result<()> {
        info!(to = %to, "welcome notification send stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sender_accepts_everything() {
        let sender = LogNotificationSender;
        assert!(sender.send_otp("user@example.com", "1234").is_ok());
        assert!(sender.send_welcome("user@example.com").is_ok());
    }
}
