//! Heartbeat monitor
//!
//! Records last-seen times per worker and evaluates staleness against a
//! fixed threshold. A worker that has never reported a heartbeat is
//! considered failed on the first scan.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Last-seen tracking for registered workers
pub struct HeartbeatMonitor {
    last_seen: Mutex<HashMap<String, Instant>>,
    timeout: Duration,
}

impl HeartbeatMonitor {
    /// Create a monitor with the given staleness threshold
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_seen: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Record a heartbeat from `address` at the current time
    pub fn record(&self, address: &str) {
        self.record_at(address, Instant::now());
        debug!(worker = address, "heartbeat received");
    }

    /// Record a heartbeat at an explicit time
    pub fn record_at(&self, address: &str, at: Instant) {
        self.last_seen.lock().insert(address.to_string(), at);
    }

    /// Last recorded heartbeat time for `address`
    pub fn last_seen(&self, address: &str) -> Option<Instant> {
        self.last_seen.lock().get(address).copied()
    }

    /// Drop tracking state for a removed worker
    pub fn forget(&self, address: &str) {
        self.last_seen.lock().remove(address);
    }

    /// Indices into `addresses` considered failed at `now`, in ascending
    /// order. Callers must process removals in descending order so that
    /// earlier removals never shift a not-yet-processed index.
    pub fn stale_indices(&self, addresses: &[String], now: Instant) -> Vec<usize> {
        let last_seen = self.last_seen.lock();
        addresses
            .iter()
            .enumerate()
            .filter(|(_, addr)| match last_seen.get(*addr) {
                Some(seen) => now.duration_since(*seen) > self.timeout,
                None => true,
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}
