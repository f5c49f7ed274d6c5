//! Process metrics
//!
//! Counters and gauges exported in Prometheus text format on /metrics.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Counter metric (monotonically increasing)
pub struct Counter {
    value: AtomicU64,
    name: &'static str,
    help: &'static str,
}

impl Counter {
    /// Create a new counter
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicU64::new(0),
            name,
            help,
        }
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} counter\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Gauge metric (can go up or down)
pub struct Gauge {
    value: AtomicI64,
    name: &'static str,
    help: &'static str,
}

impl Gauge {
    /// Create a new gauge
    pub const fn new(name: &'static str, help: &'static str) -> Self {
        Self {
            value: AtomicI64::new(0),
            name,
            help,
        }
    }

    /// Set value
    pub fn set(&self, val: i64) {
        self.value.store(val, Ordering::Relaxed);
    }

    /// Increment by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement by 1
    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get current value
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Format as Prometheus metric
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP {} {}\n# TYPE {} gauge\n{} {}\n",
            self.name, self.help, self.name, self.name, self.get()
        )
    }
}

/// Standard coordinator metrics
pub mod standard {
    use super::*;

    pub static JOBS_SUBMITTED: Counter = Counter::new(
        "hashstorm_jobs_submitted_total",
        "Total decrypt jobs accepted",
    );

    pub static JOBS_SOLVED: Counter = Counter::new(
        "hashstorm_jobs_solved_total",
        "Total decrypt jobs solved and returned",
    );

    pub static TASKS_DISPATCHED: Counter = Counter::new(
        "hashstorm_tasks_dispatched_total",
        "Total tasks dispatched at job creation",
    );

    pub static TASKS_REDISTRIBUTED: Counter = Counter::new(
        "hashstorm_tasks_redistributed_total",
        "Total tasks moved off dead workers",
    );

    pub static TRANSPORT_FAILURES: Counter = Counter::new(
        "hashstorm_transport_failures_total",
        "Total outbound calls that failed at the transport layer",
    );

    pub static EMPTY_REGISTRY_EVENTS: Counter = Counter::new(
        "hashstorm_empty_registry_events_total",
        "Times redistribution aborted because no workers survived",
    );

    pub static ACTIVE_WORKERS: Gauge =
        Gauge::new("hashstorm_active_workers", "Currently registered workers");

    pub static OUTSTANDING_JOBS: Gauge =
        Gauge::new("hashstorm_outstanding_jobs", "Jobs with a pending result slot");
}

/// Gather all standard metrics in Prometheus text format
pub fn gather() -> String {
    let mut output = String::new();

    output.push_str(&standard::JOBS_SUBMITTED.to_prometheus());
    output.push_str(&standard::JOBS_SOLVED.to_prometheus());
    output.push_str(&standard::TASKS_DISPATCHED.to_prometheus());
    output.push_str(&standard::TASKS_REDISTRIBUTED.to_prometheus());
    output.push_str(&standard::TRANSPORT_FAILURES.to_prometheus());
    output.push_str(&standard::EMPTY_REGISTRY_EVENTS.to_prometheus());

    output.push_str(&standard::ACTIVE_WORKERS.to_prometheus());
    output.push_str(&standard::OUTSTANDING_JOBS.to_prometheus());

    output
}
