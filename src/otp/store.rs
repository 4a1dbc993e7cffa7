use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::models::OtpRecord;

/// Persistence seam for OTP records; one live record per subject, upserted
/// in place.
pub trait OtpStore: Send + Sync {
    fn load(&self, subject_id: Uuid) -> Result<Option<OtpRecord>>;
    fn save(&self, record: OtpRecord) -> Result<()>;
}

/// Mutex-guarded map, good enough for local dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<Uuid, OtpRecord>>,
}

impl InMemoryOtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OtpStore for InMemoryOtpStore {
    fn load(&self, subject_id: Uuid) -> Result<Option<OtpRecord>> {
        let records = self.records.lock().expect("otp store mutex poisoned");
        Ok(records.get(&subject_id).cloned())
    }

    fn save(&self, record: OtpRecord) -> Result<()> {
        let mut records = self.records.lock().expect("otp store mutex poisoned");
        records.insert(record.subject_id, record);
        Ok(())
    }
}
