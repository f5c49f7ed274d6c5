//! Coordinator configuration
//!
//! Loaded from the environment by the binary; tests construct it directly.

use std::time::Duration;

use crate::{
    DEFAULT_HEARTBEAT_TICK_MS, DEFAULT_HEARTBEAT_TIMEOUT_MS, DEFAULT_SUBRANGE_SIZE,
    DEFAULT_TASKS_PER_JOB, DEFAULT_WORKER_PORT,
};

/// Configuration for the job coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Size of each contiguous candidate subrange
    pub subrange_size: u64,
    /// Number of tasks dispatched per job (the fixed search budget)
    pub tasks_per_job: usize,
    /// TCP port workers listen on, for addresses without an explicit port
    pub worker_port: u16,
    /// Heartbeat staleness threshold
    pub heartbeat_timeout: Duration,
    /// Liveness check interval
    pub heartbeat_tick: Duration,
    /// Initial set of worker addresses
    pub workers: Vec<String>,
    /// Bind address for the inbound HTTP surface
    pub bind_addr: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            subrange_size: DEFAULT_SUBRANGE_SIZE,
            tasks_per_job: DEFAULT_TASKS_PER_JOB,
            worker_port: DEFAULT_WORKER_PORT,
            heartbeat_timeout: Duration::from_millis(DEFAULT_HEARTBEAT_TIMEOUT_MS),
            heartbeat_tick: Duration::from_millis(DEFAULT_HEARTBEAT_TICK_MS),
            workers: Vec::new(),
            bind_addr: "0.0.0.0:8750".into(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            subrange_size: env_parse("SUBRANGE_SIZE", defaults.subrange_size),
            tasks_per_job: env_parse("TASKS_PER_JOB", defaults.tasks_per_job),
            worker_port: env_parse("WORKER_PORT", defaults.worker_port),
            heartbeat_timeout: Duration::from_millis(env_parse(
                "HEARTBEAT_TIMEOUT_MS",
                DEFAULT_HEARTBEAT_TIMEOUT_MS,
            )),
            heartbeat_tick: Duration::from_millis(env_parse(
                "HEARTBEAT_TICK_MS",
                DEFAULT_HEARTBEAT_TICK_MS,
            )),
            workers: std::env::var("WORKERS")
                .map(|v| parse_worker_list(&v))
                .unwrap_or_default(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

/// Parse a comma-separated worker address list
pub fn parse_worker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
