//! Adaptive per-(IP, device) rate limiting for auth flows.
//!
//! Brute-force protection: a tracker is derived from the client IP and a
//! device identifier, counted inside a short window, and blocked for 24
//! hours once it goes over the threshold. State lives behind the
//! `TrackerStore` trait so the in-memory default can be swapped for a
//! distributed backend without touching the decision logic. This is
//! advisory, in-process, best-effort protection: it does not survive a
//! restart and is not shared across horizontally scaled instances.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;

const WINDOW_SECONDS: i64 = 3 * 60;
const BLOCK_SECONDS: i64 = 24 * 60 * 60;
const MAX_ATTEMPTS_PER_WINDOW: u32 = 20;

pub const UNKNOWN_IP: &str = "unknown-ip";
pub const UNKNOWN_DEVICE: &str = "unknown-device";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Blocked { until: DateTime<Utc> },
}

pub trait RateLimiter: Send + Sync {
    fn check(&self, ip: Option<&str>, device_id: Option<&str>) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _ip: Option<&str>, _device_id: Option<&str>) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Derive the tracker key for a client; raw IPs and user agents are hashed
/// and never stored.
#[must_use]
pub fn tracker_key(ip: Option<&str>, device_id: Option<&str>) -> String {
    let ip = ip.filter(|value| !value.is_empty()).unwrap_or(UNKNOWN_IP);
    let device = device_id
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_DEVICE);

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(b"|");
    hasher.update(device.as_bytes());
    let digest = hasher.finalize();

    let mut key = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(key, "{byte:02x}");
    }
    key
}

/// A tracker is either inside a counting window or blocked, never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Counting {
        count: u32,
        window_start: DateTime<Utc>,
    },
    Blocked {
        until: DateTime<Utc>,
    },
}

/// Storage seam for tracker state; swap for a shared cache to rate limit
/// across instances.
pub trait TrackerStore: Send + Sync {
    fn load(&self, key: &str) -> Option<TrackerState>;
    fn store(&self, key: &str, state: TrackerState);
    fn clear(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryTrackerStore {
    entries: Mutex<HashMap<String, TrackerState>>,
}

impl InMemoryTrackerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackerStore for InMemoryTrackerStore {
    fn load(&self, key: &str) -> Option<TrackerState> {
        let entries = self.entries.lock().expect("tracker store mutex poisoned");
        entries.get(key).copied()
    }

    fn store(&self, key: &str, state: TrackerState) {
        let mut entries = self.entries.lock().expect("tracker store mutex poisoned");
        entries.insert(key.to_string(), state);
    }

    fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().expect("tracker store mutex poisoned");
        entries.remove(key);
    }
}

/// Counting-window limiter: up to 20 requests per tracker per 3 minutes,
/// then a 24 hour block.
pub struct AdaptiveRateLimiter {
    store: Arc<dyn TrackerStore>,
    clock: Arc<dyn Clock>,
    // The decision is a load-modify-store over the tracker store; without
    // this lock two concurrent checks could both read the same count and
    // both pass on one budget slot.
    decision_lock: Mutex<()>,
}

impl AdaptiveRateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn TrackerStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            decision_lock: Mutex::new(()),
        }
    }
}

impl RateLimiter for AdaptiveRateLimiter {
    fn check(&self, ip: Option<&str>, device_id: Option<&str>) -> RateLimitDecision {
        let key = tracker_key(ip, device_id);
        let now = self.clock.now();
        let _guard = self
            .decision_lock
            .lock()
            .expect("rate limit decision mutex poisoned");

        match self.store.load(&key) {
            Some(TrackerState::Blocked { until }) if now < until => {
                RateLimitDecision::Blocked { until }
            }
            Some(TrackerState::Blocked { .. }) | None => {
                // Expired blocks restart as a fresh tracker.
                self.store.store(
                    &key,
                    TrackerState::Counting {
                        count: 1,
                        window_start: now,
                    },
                );
                RateLimitDecision::Allowed
            }
            Some(TrackerState::Counting {
                count,
                window_start,
            }) => {
                if now - window_start < Duration::seconds(WINDOW_SECONDS) {
                    let count = count + 1;
                    if count > MAX_ATTEMPTS_PER_WINDOW {
                        let until = now + Duration::seconds(BLOCK_SECONDS);
                        self.store.store(&key, TrackerState::Blocked { until });
                        RateLimitDecision::Blocked { until }
                    } else {
                        self.store.store(
                            &key,
                            TrackerState::Counting {
                                count,
                                window_start,
                            },
                        );
                        RateLimitDecision::Allowed
                    }
                } else {
                    self.store.store(
                        &key,
                        TrackerState::Counting {
                            count: 1,
                            window_start: now,
                        },
                    );
                    RateLimitDecision::Allowed
                }
            }
        }
    }
}
