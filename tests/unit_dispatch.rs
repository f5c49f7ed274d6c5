//! Unit tests for dispatch, completion, and redistribution
//!
//! Drives the coordinator against a recording RPC mock: round-robin
//! assignment, duplicate-completion suppression, and the liveness scan's
//! failure-redistribution path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use hashstorm_core::config::CoordinatorConfig;
use hashstorm_core::coordinator::JobCoordinator;
use hashstorm_core::error::{CoordinatorError, Result};
use hashstorm_core::rpc::WorkerRpc;

/// Records every call and reports every subrange as exhausted, so jobs
/// stay outstanding until a test completes them by hand.
#[derive(Default)]
struct RecordingRpc {
    searches: Mutex<Vec<(String, u64, u64, String)>>,
    terminates: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl WorkerRpc for RecordingRpc {
    async fn start_search(
        &self,
        address: &str,
        lower: u64,
        upper: u64,
        job_id: &str,
    ) -> Result<Option<String>> {
        self.searches
            .lock()
            .push((address.into(), lower, upper, job_id.into()));
        Ok(None)
    }

    async fn terminate(&self, address: &str, job_id: &str) -> Result<()> {
        self.terminates.lock().push((address.into(), job_id.into()));
        Ok(())
    }
}

/// Every call fails at the transport layer.
struct UnreachableRpc;

#[async_trait]
impl WorkerRpc for UnreachableRpc {
    async fn start_search(&self, address: &str, _: u64, _: u64, _: &str) -> Result<Option<String>> {
        Err(CoordinatorError::ConnectionFailed {
            endpoint: address.into(),
            reason: "connection refused".into(),
        })
    }

    async fn terminate(&self, address: &str, _: &str) -> Result<()> {
        Err(CoordinatorError::ConnectionFailed {
            endpoint: address.into(),
            reason: "connection refused".into(),
        })
    }
}

fn config(workers: &[&str], tasks_per_job: usize, subrange_size: u64) -> CoordinatorConfig {
    CoordinatorConfig {
        subrange_size,
        tasks_per_job,
        workers: workers.iter().map(|w| w.to_string()).collect(),
        ..Default::default()
    }
}

/// Short staleness threshold so tests can age workers out by sleeping.
fn config_with_timeout(
    workers: &[&str],
    tasks_per_job: usize,
    timeout: Duration,
) -> CoordinatorConfig {
    CoordinatorConfig {
        heartbeat_timeout: timeout,
        ..config(workers, tasks_per_job, 100)
    }
}

fn spawn_decrypt(
    coordinator: &Arc<JobCoordinator>,
    job_id: &str,
) -> tokio::task::JoinHandle<Result<String>> {
    let coordinator = Arc::clone(coordinator);
    let job_id = job_id.to_string();
    tokio::spawn(async move { coordinator.decrypt(job_id).await })
}

#[tokio::test]
async fn test_round_robin_assignment() {
    let rpc = Arc::new(RecordingRpc::default());
    let coordinator = JobCoordinator::new(config(&["w0", "w1", "w2"], 10, 100), rpc.clone());

    let handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(100)).await;

    // 10 tasks over 3 workers: {4, 3, 3}
    assert_eq!(coordinator.tasks_for("w0").await.len(), 4);
    assert_eq!(coordinator.tasks_for("w1").await.len(), 3);
    assert_eq!(coordinator.tasks_for("w2").await.len(), 3);

    // task i and i+3 land on the same worker
    let lowers: Vec<u64> = coordinator
        .tasks_for("w0")
        .await
        .iter()
        .map(|t| t.lower)
        .collect();
    assert_eq!(lowers, [0, 300, 600, 900]);

    // subranges are contiguous and equal-size
    for task in coordinator.tasks_for("w1").await {
        assert_eq!(task.upper, task.lower + 100);
    }
    assert_eq!(rpc.searches.lock().len(), 10);

    coordinator
        .handle_search_result("job", Some("opensesame".into()))
        .await;
    assert_eq!(handle.await.unwrap().unwrap(), "opensesame");
}

#[tokio::test]
async fn test_empty_registry_rejects_decrypt() {
    let coordinator = JobCoordinator::new(config(&[], 4, 100), Arc::new(RecordingRpc::default()));

    let err = coordinator.decrypt("job".into()).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::EmptyRegistry));
    assert_eq!(coordinator.outstanding_jobs().await, 0);
}

#[tokio::test]
async fn test_duplicate_completion_is_noop() {
    let rpc = Arc::new(RecordingRpc::default());
    let coordinator = JobCoordinator::new(config(&["w0", "w1"], 4, 100), rpc.clone());

    let solved = spawn_decrypt(&coordinator, "solved");
    let pending = spawn_decrypt(&coordinator, "pending");
    sleep(Duration::from_millis(100)).await;
    assert_eq!(coordinator.outstanding_tasks().await, 8);

    coordinator
        .handle_search_result("solved", Some("first".into()))
        .await;
    assert_eq!(solved.await.unwrap().unwrap(), "first");

    // Only the solved job's ledger entries are purged
    assert_eq!(coordinator.outstanding_tasks().await, 4);
    let jobs_before = coordinator.outstanding_jobs().await;

    // A late completion for the same job changes nothing
    coordinator
        .handle_search_result("solved", Some("second".into()))
        .await;
    assert_eq!(coordinator.outstanding_tasks().await, 4);
    assert_eq!(coordinator.outstanding_jobs().await, jobs_before);

    // Terminate was broadcast once per registered worker
    sleep(Duration::from_millis(100)).await;
    assert_eq!(rpc.terminates.lock().len(), 2);

    coordinator
        .handle_search_result("pending", Some("done".into()))
        .await;
    assert_eq!(pending.await.unwrap().unwrap(), "done");
}

#[tokio::test]
async fn test_not_found_leaves_job_outstanding() {
    let coordinator =
        JobCoordinator::new(config(&["w0"], 2, 100), Arc::new(RecordingRpc::default()));

    let handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(100)).await;

    coordinator.handle_search_result("job", None).await;
    assert_eq!(coordinator.outstanding_jobs().await, 1);
    assert_eq!(coordinator.outstanding_tasks().await, 2);
    assert!(!handle.is_finished());

    coordinator
        .handle_search_result("job", Some("pw".into()))
        .await;
    assert_eq!(handle.await.unwrap().unwrap(), "pw");
}

#[tokio::test]
async fn test_redistribution_moves_dead_workers_tasks() {
    let rpc = Arc::new(RecordingRpc::default());
    let coordinator = JobCoordinator::new(
        config_with_timeout(&["w0", "w1", "w2"], 10, Duration::from_millis(100)),
        rpc.clone(),
    );

    let _handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(100)).await;
    let dead_lowers: Vec<u64> = coordinator
        .tasks_for("w1")
        .await
        .iter()
        .map(|t| t.lower)
        .collect();
    assert_eq!(dead_lowers, [100, 400, 700]);

    // Age everyone past the threshold, then revive all but w1
    sleep(Duration::from_millis(150)).await;
    coordinator.record_heartbeat("w0");
    coordinator.record_heartbeat("w2");
    coordinator.check_liveness().await.unwrap();

    assert_eq!(coordinator.worker_addresses().await, ["w0", "w2"]);
    assert!(coordinator.tasks_for("w1").await.is_empty());
    assert_eq!(coordinator.outstanding_tasks().await, 10);

    // w1's tasks had routing index 1; 1 % 2 survivors = index 1 = w2,
    // and each moved task appears exactly once
    let survivor_lowers: Vec<u64> = coordinator
        .tasks_for("w2")
        .await
        .iter()
        .map(|t| t.lower)
        .collect();
    for lower in dead_lowers {
        assert_eq!(survivor_lowers.iter().filter(|&&l| l == lower).count(), 1);
    }

    // The moved subranges were re-issued against the same job
    sleep(Duration::from_millis(100)).await;
    assert_eq!(rpc.searches.lock().len(), 13);
}

#[tokio::test]
async fn test_dead_positions_one_and_three_in_one_pass() {
    let coordinator = JobCoordinator::new(
        config_with_timeout(&["w0", "w1", "w2", "w3"], 4, Duration::from_millis(100)),
        Arc::new(RecordingRpc::default()),
    );

    sleep(Duration::from_millis(150)).await;
    coordinator.record_heartbeat("w0");
    coordinator.record_heartbeat("w2");
    coordinator.check_liveness().await.unwrap();

    // Descending-order removal must leave the original positions 0 and 2
    assert_eq!(coordinator.worker_addresses().await, ["w0", "w2"]);
}

#[tokio::test]
async fn test_single_survivor_redistributes_without_fatal() {
    let coordinator = JobCoordinator::new(
        config_with_timeout(&["w0", "w1"], 4, Duration::from_millis(100)),
        Arc::new(RecordingRpc::default()),
    );

    let _handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(150)).await;

    coordinator.record_heartbeat("w0");
    coordinator.check_liveness().await.unwrap();

    assert_eq!(coordinator.worker_addresses().await, ["w0"]);
    assert_eq!(coordinator.tasks_for("w0").await.len(), 4);
}

#[tokio::test]
async fn test_zero_survivors_is_fatal() {
    let coordinator = JobCoordinator::new(
        config_with_timeout(&["w0"], 4, Duration::from_millis(100)),
        Arc::new(RecordingRpc::default()),
    );

    let _handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(150)).await;

    // No heartbeats after startup: the only worker dies with tasks outstanding
    let err = coordinator.check_liveness().await.unwrap_err();
    assert!(matches!(err, CoordinatorError::EmptyRegistry));
    assert!(coordinator.worker_addresses().await.is_empty());
}

#[tokio::test]
async fn test_initial_workers_survive_startup() {
    let coordinator = JobCoordinator::new(
        CoordinatorConfig {
            heartbeat_timeout: Duration::from_millis(400),
            heartbeat_tick: Duration::from_millis(50),
            ..config(&["w0", "w1"], 4, 100)
        },
        Arc::new(RecordingRpc::default()),
    );
    coordinator.start();

    // The scan loop ticks immediately; the initial set gets a full
    // threshold of grace before its first heartbeat is due
    sleep(Duration::from_millis(100)).await;
    assert_eq!(coordinator.worker_addresses().await, ["w0", "w1"]);

    coordinator.record_heartbeat("w0");
    coordinator.record_heartbeat("w1");
    sleep(Duration::from_millis(250)).await;
    assert_eq!(coordinator.worker_addresses().await, ["w0", "w1"]);

    // Once heartbeats stop, the loop removes both past the threshold
    sleep(Duration::from_millis(600)).await;
    assert!(coordinator.worker_addresses().await.is_empty());
}

#[tokio::test]
async fn test_transport_failure_abandons_task_without_retry() {
    let coordinator = JobCoordinator::new(config(&["w0"], 2, 100), Arc::new(UnreachableRpc));

    let handle = spawn_decrypt(&coordinator, "job");
    sleep(Duration::from_millis(100)).await;

    // Failed dispatches stay in the ledger but are never re-issued
    assert_eq!(coordinator.outstanding_tasks().await, 2);
    assert!(!handle.is_finished());

    // The job can still be completed through the normal path
    coordinator
        .handle_search_result("job", Some("pw".into()))
        .await;
    assert_eq!(handle.await.unwrap().unwrap(), "pw");
    assert_eq!(coordinator.outstanding_tasks().await, 0);
}
