use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Live one-time-password state for a subject.
///
/// Only the hash of the code is stored; the plaintext code exists solely in
/// the outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub subject_id: Uuid,
    pub code_hash: String,
    pub attempt_count: u32,
    pub expires_at: DateTime<Utc>,
    pub last_issued_at: DateTime<Utc>,
}

/// Safe projection of a dispatch returned to callers; never carries the
/// code or its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpDispatch {
    pub subject_id: Uuid,
    pub attempt_count: u32,
    pub expires_at: DateTime<Utc>,
}

impl From<&OtpRecord> for OtpDispatch {
    fn from(record: &OtpRecord) -> Self {
        Self {
            subject_id: record.subject_id,
            attempt_count: record.attempt_count,
            expires_at: record.expires_at,
        }
    }
}
