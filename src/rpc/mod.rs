//! Worker RPC surface
//!
//! Wire message types and the outbound client trait the coordinator
//! dispatches through. One connection per call; frames are
//! newline-delimited JSON.

pub mod client;

pub use client::TcpWorkerClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Request frame sent to a worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Search the half-open candidate range `[lower, upper)` for `job_id`
    StartSearch { lower: u64, upper: u64, job_id: String },
    /// Advisory: stop any work for `job_id`
    Terminate { job_id: String },
}

/// Reply frame for a search call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchReply {
    /// Recovered plaintext, or null if the subrange was exhausted
    #[serde(default)]
    pub password: Option<String>,
    /// Worker-reported failure, treated as not-found for the subrange
    #[serde(default)]
    pub error: Option<String>,
}

/// Outbound RPC adapter the coordinator depends on
///
/// Implemented by [`TcpWorkerClient`] in production and by mocks in tests.
#[async_trait]
pub trait WorkerRpc: Send + Sync + 'static {
    /// Issue a search call. `Ok(Some(_))` is a hit, `Ok(None)` means the
    /// subrange was exhausted without a match.
    async fn start_search(
        &self,
        address: &str,
        lower: u64,
        upper: u64,
        job_id: &str,
    ) -> Result<Option<String>>;

    /// Fire-and-forget termination signal for a solved job
    async fn terminate(&self, address: &str, job_id: &str) -> Result<()>;
}
