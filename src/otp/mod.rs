//! One-time-password ledger.
//!
//! Per subject the ledger moves through `NoCode -> Issued -> {Verified |
//! Expired | AttemptsExhausted}`. At most one live record exists per
//! subject; re-issuance overwrites the code and expiry in place. All
//! read-modify-write sequences are serialized behind a per-subject lock so
//! concurrent resends cannot race the attempt counter.

mod models;
mod service;
mod store;

pub use models::{OtpDispatch, OtpRecord};
pub use service::{DEFAULT_OTP_TTL_SECONDS, OtpConfig, OtpService};
pub use store::{InMemoryOtpStore, OtpStore};
