//! Job result table
//!
//! One-shot result slots keyed by job id. A slot is fulfilled at most
//! once; every later completion for the same job is a no-op.

use std::collections::HashMap;

use tokio::sync::oneshot;

/// Pending/fulfilled result slot for one job
#[derive(Debug)]
struct JobSlot {
    sender: Option<oneshot::Sender<String>>,
}

/// Mapping from job id to its result slot
#[derive(Debug, Default)]
pub struct JobTable {
    slots: HashMap<String, JobSlot>,
}

impl JobTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a result slot for `job_id` and return its receiver.
    ///
    /// A second create for the same id replaces the slot; the earlier
    /// receiver then resolves with an error.
    pub fn create(&mut self, job_id: &str) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        self.slots.insert(
            job_id.to_string(),
            JobSlot { sender: Some(tx) },
        );
        rx
    }

    /// Fulfill the slot for `job_id`. Returns true only for the first
    /// fulfillment; a missing or already-fulfilled slot yields false.
    pub fn fulfill(&mut self, job_id: &str, plaintext: String) -> bool {
        match self.slots.get_mut(job_id).and_then(|s| s.sender.take()) {
            // The receiver can only be gone if the caller abandoned the
            // job; the slot is still considered consumed either way.
            Some(tx) => {
                let _ = tx.send(plaintext);
                true
            }
            None => false,
        }
    }

    /// Drop the slot for `job_id` after its result has been consumed
    pub fn remove(&mut self, job_id: &str) {
        self.slots.remove(job_id);
    }

    /// Number of jobs currently tracked
    pub fn outstanding(&self) -> usize {
        self.slots.len()
    }
}
