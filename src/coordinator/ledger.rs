//! Per-worker task ledger
//!
//! Tracks which tasks are outstanding on which worker, for cleanup on
//! solve and for redistribution on worker failure.

use std::collections::HashMap;

/// One worker's assigned subrange of the candidate space for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Inclusive lower bound of the subrange
    pub lower: u64,
    /// Exclusive upper bound of the subrange
    pub upper: u64,
    /// Routing index assigned at dispatch or redistribution time
    pub worker_id: usize,
    /// Owning job (credential fingerprint)
    pub job_id: String,
}

/// Mapping from worker address to its outstanding tasks
#[derive(Debug, Default)]
pub struct TaskLedger {
    tasks: HashMap<String, Vec<Task>>,
}

impl TaskLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task against a worker address
    pub fn append(&mut self, address: &str, task: Task) {
        self.tasks.entry(address.to_string()).or_default().push(task);
    }

    /// Remove every task belonging to `job_id`, across all workers.
    /// Returns the number of entries purged.
    pub fn remove_job(&mut self, job_id: &str) -> usize {
        let mut purged = 0;
        for tasks in self.tasks.values_mut() {
            let before = tasks.len();
            tasks.retain(|t| t.job_id != job_id);
            purged += before - tasks.len();
        }
        purged
    }

    /// Remove and return every task assigned to `address`
    pub fn drain_worker(&mut self, address: &str) -> Vec<Task> {
        self.tasks.remove(address).unwrap_or_default()
    }

    /// Tasks currently assigned to `address`
    pub fn tasks_for(&self, address: &str) -> &[Task] {
        self.tasks.get(address).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total outstanding task count
    pub fn outstanding(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }
}
