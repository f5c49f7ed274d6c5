//! TCP worker client
//!
//! Opens one short-lived connection per call and exchanges
//! newline-delimited JSON frames with the worker.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use super::{SearchReply, WorkerRequest, WorkerRpc};
use crate::error::{CoordinatorError, Result};

/// Production [`WorkerRpc`] implementation over plain TCP
pub struct TcpWorkerClient {
    worker_port: u16,
    connect_timeout: Duration,
}

impl TcpWorkerClient {
    /// Create a client that dials `address:worker_port` for bare addresses
    pub fn new(worker_port: u16) -> Self {
        Self {
            worker_port,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Addresses may carry an explicit port; otherwise the configured
    /// worker port is appended.
    fn endpoint(&self, address: &str) -> String {
        if address.contains(':') {
            address.to_string()
        } else {
            format!("{}:{}", address, self.worker_port)
        }
    }

    async fn connect(&self, endpoint: &str) -> Result<TcpStream> {
        let connect = TcpStream::connect(endpoint);
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(CoordinatorError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CoordinatorError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: "connect timed out".into(),
            }),
        }
    }

    async fn send_frame(&self, stream: &mut TcpStream, request: &WorkerRequest) -> Result<()> {
        let mut frame =
            serde_json::to_vec(request).map_err(|e| CoordinatorError::InvalidFrame {
                reason: e.to_string(),
            })?;
        frame.push(b'\n');
        stream
            .write_all(&frame)
            .await
            .map_err(|e| CoordinatorError::ConnectionFailed {
                endpoint: peer_name(stream),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl WorkerRpc for TcpWorkerClient {
    async fn start_search(
        &self,
        address: &str,
        lower: u64,
        upper: u64,
        job_id: &str,
    ) -> Result<Option<String>> {
        let endpoint = self.endpoint(address);
        let mut stream = self.connect(&endpoint).await?;

        let request = WorkerRequest::StartSearch {
            lower,
            upper,
            job_id: job_id.to_string(),
        };
        self.send_frame(&mut stream, &request).await?;

        let mut line = String::new();
        BufReader::new(stream)
            .read_line(&mut line)
            .await
            .map_err(|e| CoordinatorError::ConnectionFailed {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let reply: SearchReply =
            serde_json::from_str(line.trim()).map_err(|e| CoordinatorError::InvalidFrame {
                reason: e.to_string(),
            })?;

        if let Some(fault) = reply.error {
            return Err(CoordinatorError::WorkerFault {
                endpoint,
                reason: fault,
            });
        }

        debug!(%endpoint, job_id, hit = reply.password.is_some(), "search call completed");
        Ok(reply.password)
    }

    async fn terminate(&self, address: &str, job_id: &str) -> Result<()> {
        let endpoint = self.endpoint(address);
        let mut stream = self.connect(&endpoint).await?;

        let request = WorkerRequest::Terminate {
            job_id: job_id.to_string(),
        };
        self.send_frame(&mut stream, &request).await
    }
}

fn peer_name(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into())
}
