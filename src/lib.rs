//! # Kunci (Authentication Core)
//!
//! `kunci` handles the authentication lifecycle: credential verification,
//! one-time-password issuance and verification, access/refresh token
//! signing, and adaptive per-client rate limiting.
//!
//! ## Flow
//!
//! Sign-in never returns tokens directly. Credentials (or a fresh
//! registration) trigger a short-lived one-time code; verifying the code
//! marks the account verified and mints the access/refresh token pair.
//! Refresh re-resolves the subject and mints a new access token only.
//!
//! ## Collaborators
//!
//! User persistence, outbound mail/SMS, and rate-limit state sit behind
//! narrow traits (`UserStore`, `NotificationSender`, `TrackerStore`) with
//! in-memory defaults; swap them for real backends without touching the
//! flows.
//!
//! ## Abuse protection
//!
//! A per-(IP, device) tracker allows 20 requests per 3 minute window, then
//! blocks the client for 24 hours. The tracker is process-local and
//! best-effort; it is not shared across instances.

pub mod api;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod notify;
pub mod otp;
pub mod password;
pub mod rate_limit;
pub mod token;
pub mod users;

pub const GIT_COMMIT_HASH: &str = env!("KUNCI_GIT_SHA");

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
