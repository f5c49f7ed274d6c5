//! Coordinator service binary

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hashstorm_core::config::CoordinatorConfig;
use hashstorm_core::coordinator::JobCoordinator;
use hashstorm_core::rpc::TcpWorkerClient;
use hashstorm_core::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CoordinatorConfig::from_env();
    info!(
        workers = config.workers.len(),
        tasks_per_job = config.tasks_per_job,
        subrange_size = config.subrange_size,
        "starting hashstorm coordinator"
    );

    let rpc = Arc::new(TcpWorkerClient::new(config.worker_port));
    let coordinator = JobCoordinator::new(config.clone(), rpc);

    // Liveness scan loop
    coordinator.start();

    let app = server::router(coordinator);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
