//! Hashstorm Core - Coordinator for distributed credential recovery
//!
//! This crate provides the coordinator ("master") side of the cluster:
//! - Job creation and search-space partitioning
//! - Round-robin task dispatch to remote workers
//! - Heartbeat-driven liveness tracking
//! - Redistribution of a dead worker's tasks to survivors

pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod rpc;
pub mod server;

pub use coordinator::JobCoordinator;
pub use error::CoordinatorError;

/// Default size of one contiguous candidate subrange
pub const DEFAULT_SUBRANGE_SIZE: u64 = 10_000_000;

/// Default number of tasks dispatched per job
pub const DEFAULT_TASKS_PER_JOB: usize = 8;

/// Default TCP port workers listen on for search/terminate calls
pub const DEFAULT_WORKER_PORT: u16 = 9091;

/// Default heartbeat staleness threshold in milliseconds
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 5_000;

/// Default liveness check interval in milliseconds (half the threshold)
pub const DEFAULT_HEARTBEAT_TICK_MS: u64 = 2_500;
