//! Coordinator for job dispatch and worker liveness
//!
//! Partitions the candidate space, routes tasks round-robin over the
//! worker registry, and redistributes tasks when workers die.

pub mod dispatcher;
pub mod heartbeat;
pub mod jobs;
pub mod ledger;
pub mod registry;

pub use dispatcher::JobCoordinator;
pub use heartbeat::HeartbeatMonitor;
pub use jobs::JobTable;
pub use ledger::{Task, TaskLedger};
pub use registry::WorkerRegistry;
