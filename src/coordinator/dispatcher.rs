//! Job coordinator
//!
//! Creates jobs, partitions the candidate space, dispatches tasks
//! round-robin over the registry, and redistributes tasks from dead
//! workers. All registry and ledger mutation - dispatch, completion,
//! liveness scan - is serialized under one exclusive lock.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use super::heartbeat::HeartbeatMonitor;
use super::jobs::JobTable;
use super::ledger::{Task, TaskLedger};
use super::registry::WorkerRegistry;
use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, Result};
use crate::metrics::standard;
use crate::rpc::WorkerRpc;

/// Registry and ledger share one index space, so they live behind a
/// single lock.
struct CoordinatorState {
    registry: WorkerRegistry,
    ledger: TaskLedger,
}

/// Main coordinator
pub struct JobCoordinator {
    config: CoordinatorConfig,
    state: Mutex<CoordinatorState>,
    jobs: Mutex<JobTable>,
    heartbeats: HeartbeatMonitor,
    rpc: Arc<dyn WorkerRpc>,
    /// Bounded pool for outbound calls, sized to hardware parallelism
    call_permits: Arc<Semaphore>,
}

impl JobCoordinator {
    /// Create a coordinator with the configured initial worker set
    pub fn new(config: CoordinatorConfig, rpc: Arc<dyn WorkerRpc>) -> Arc<Self> {
        let registry = WorkerRegistry::new(config.workers.clone());
        standard::ACTIVE_WORKERS.set(registry.len() as i64);

        // Seed last-seen for the initial set so the first scan grants each
        // worker one full threshold to report before being declared dead.
        let heartbeats = HeartbeatMonitor::new(config.heartbeat_timeout);
        let started = Instant::now();
        for address in registry.addresses() {
            heartbeats.record_at(address, started);
        }

        Arc::new(Self {
            heartbeats,
            config,
            state: Mutex::new(CoordinatorState {
                registry,
                ledger: TaskLedger::new(),
            }),
            jobs: Mutex::new(JobTable::new()),
            rpc,
            call_permits: Arc::new(Semaphore::new(num_cpus::get() * 2)),
        })
    }

    /// Start the periodic liveness scan
    pub fn start(self: &Arc<Self>) {
        let coordinator = Arc::clone(self);
        let tick = self.config.heartbeat_tick;
        tokio::spawn(async move {
            let mut ticker = interval(tick);
            loop {
                ticker.tick().await;
                if let Err(e) = coordinator.check_liveness().await {
                    standard::EMPTY_REGISTRY_EVENTS.inc();
                    error!("liveness scan aborted: {e}");
                }
            }
        });
    }

    /// Recover the plaintext for an encrypted credential.
    ///
    /// Dispatches the fixed initial budget of subranges and resolves when
    /// the first worker reports a hit. If the plaintext lies outside
    /// `tasks_per_job * subrange_size` candidates, no further ranges are
    /// requested and this call never resolves.
    pub async fn decrypt(self: &Arc<Self>, credential: String) -> Result<String> {
        standard::JOBS_SUBMITTED.inc();
        info!(job_id = %credential, "decrypt job accepted");

        let receiver = self.jobs.lock().await.create(&credential);
        standard::OUTSTANDING_JOBS.inc();

        if let Err(e) = self.dispatch_job(&credential).await {
            self.jobs.lock().await.remove(&credential);
            standard::OUTSTANDING_JOBS.dec();
            return Err(e);
        }

        let plaintext = receiver.await.map_err(|_| CoordinatorError::Internal {
            message: format!("result slot for job {credential} dropped before fulfillment"),
        })?;

        self.jobs.lock().await.remove(&credential);
        standard::OUTSTANDING_JOBS.dec();
        standard::JOBS_SOLVED.inc();
        info!(job_id = %credential, "decrypt job solved");
        Ok(plaintext)
    }

    /// Partition the initial search budget and dispatch one task per
    /// subrange, round-robin over the current registry.
    async fn dispatch_job(self: &Arc<Self>, job_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.registry.is_empty() {
            return Err(CoordinatorError::EmptyRegistry);
        }

        for task_id in 0..self.config.tasks_per_job {
            let worker_id = task_id % state.registry.len();
            let address = state.registry.addresses()[worker_id].clone();

            let lower = task_id as u64 * self.config.subrange_size;
            let upper = lower + self.config.subrange_size;

            state.ledger.append(
                &address,
                Task {
                    lower,
                    upper,
                    worker_id,
                    job_id: job_id.to_string(),
                },
            );
            self.spawn_search(address, lower, upper, job_id.to_string());
            standard::TASKS_DISPATCHED.inc();
        }
        Ok(())
    }

    /// Issue a non-blocking search call whose completion routes back into
    /// [`handle_search_result`](Self::handle_search_result).
    ///
    /// A transport failure here only logs: the task stays in its ledger
    /// entry and is retried only if its worker is later declared dead.
    fn spawn_search(self: &Arc<Self>, address: String, lower: u64, upper: u64, job_id: String) {
        let coordinator = Arc::clone(self);
        let permits = Arc::clone(&self.call_permits);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            match coordinator
                .rpc
                .start_search(&address, lower, upper, &job_id)
                .await
            {
                Ok(outcome) => coordinator.handle_search_result(&job_id, outcome).await,
                Err(e) => {
                    if e.is_transport() {
                        standard::TRANSPORT_FAILURES.inc();
                    }
                    warn!(worker = %address, job_id, lower, upper, "search call failed: {e}");
                }
            }
        });
    }

    /// Completion path for search calls.
    ///
    /// An empty outcome leaves the job outstanding. A hit fulfills the
    /// result slot (first completion wins), purges the job's ledger
    /// entries everywhere, and broadcasts an advisory terminate to every
    /// registered worker.
    pub async fn handle_search_result(self: &Arc<Self>, job_id: &str, outcome: Option<String>) {
        let Some(plaintext) = outcome else {
            debug!(job_id, "subrange exhausted without a match");
            return;
        };

        let mut state = self.state.lock().await;
        if !self.jobs.lock().await.fulfill(job_id, plaintext) {
            debug!(job_id, "duplicate completion ignored");
            return;
        }

        let purged = state.ledger.remove_job(job_id);
        info!(job_id, purged, "first hit for job, purging ledger");

        let addresses = state.registry.addresses().to_vec();
        drop(state);
        self.broadcast_terminate(addresses, job_id);
    }

    /// Best-effort terminate broadcast, sent to every worker regardless
    /// of whether it still holds a task for the job.
    fn broadcast_terminate(&self, addresses: Vec<String>, job_id: &str) {
        for address in addresses {
            let rpc = Arc::clone(&self.rpc);
            let permits = Arc::clone(&self.call_permits);
            let job_id = job_id.to_string();
            tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                if let Err(e) = rpc.terminate(&address, &job_id).await {
                    warn!(worker = %address, job_id, "terminate signal failed: {e}");
                }
            });
        }
    }

    /// Record a heartbeat from a worker address
    pub fn record_heartbeat(&self, address: &str) {
        self.heartbeats.record(address);
    }

    /// One liveness scan: remove stale workers and redistribute their
    /// tasks to survivors.
    ///
    /// Stale indices are collected ascending and removed descending, so
    /// earlier removals never invalidate a pending index. Each drained
    /// task is rerouted via `worker_id % survivors` and re-issued against
    /// the same job.
    pub async fn check_liveness(self: &Arc<Self>) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.lock().await;

        let stale = self
            .heartbeats
            .stale_indices(state.registry.addresses(), now);
        if stale.is_empty() {
            return Ok(());
        }

        let mut dead = Vec::with_capacity(stale.len());
        for index in stale.iter().rev() {
            if let Some(address) = state.registry.remove(*index) {
                warn!(worker = %address, index, "worker declared dead");
                self.heartbeats.forget(&address);
                dead.push(address);
            }
        }
        standard::ACTIVE_WORKERS.set(state.registry.len() as i64);

        for address in dead {
            for task in state.ledger.drain_worker(&address) {
                let survivors = state.registry.len();
                if survivors == 0 {
                    error!(
                        job_id = %task.job_id,
                        "no surviving workers, dropping outstanding tasks"
                    );
                    return Err(CoordinatorError::EmptyRegistry);
                }

                let worker_id = task.worker_id % survivors;
                let destination = state.registry.addresses()[worker_id].clone();
                info!(
                    job_id = %task.job_id,
                    from = %address,
                    to = %destination,
                    lower = task.lower,
                    upper = task.upper,
                    "redistributing task"
                );

                state.ledger.append(
                    &destination,
                    Task {
                        worker_id,
                        ..task.clone()
                    },
                );
                self.spawn_search(destination, task.lower, task.upper, task.job_id.clone());
                standard::TASKS_REDISTRIBUTED.inc();
            }
        }
        Ok(())
    }

    /// Registered worker addresses in order
    pub async fn worker_addresses(&self) -> Vec<String> {
        self.state.lock().await.registry.addresses().to_vec()
    }

    /// Outstanding tasks for one worker address
    pub async fn tasks_for(&self, address: &str) -> Vec<Task> {
        self.state.lock().await.ledger.tasks_for(address).to_vec()
    }

    /// Total outstanding task count across all workers
    pub async fn outstanding_tasks(&self) -> usize {
        self.state.lock().await.ledger.outstanding()
    }

    /// Number of jobs with a live result slot
    pub async fn outstanding_jobs(&self) -> usize {
        self.jobs.lock().await.outstanding()
    }
}
