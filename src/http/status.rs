//! Operational status endpoints.
//!
//! `/ping` and `/health` render the pool: strategy, every backend with its
//! counters and health, and the request total. Read only.

use axum::{Json, extract::State};
use serde::Serialize;
use std::time::UNIX_EPOCH;

use crate::http::server::AppState;
use crate::load_balancer::{Backend, BackendPool};

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub url: String,
    pub weight: u32,
    pub healthy: bool,
    pub active_connections: usize,
    pub total_requests: u64,
    /// Milliseconds since the Unix epoch, absent until the first request.
    pub last_request_unix_ms: Option<u64>,
}

impl From<&Backend> for BackendStatus {
    fn from(backend: &Backend) -> Self {
        let snapshot = backend.snapshot();
        Self {
            url: backend.address().to_string(),
            weight: backend.weight(),
            healthy: snapshot.healthy,
            active_connections: snapshot.active_connections,
            total_requests: snapshot.total_requests,
            last_request_unix_ms: snapshot
                .last_request_time
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub strategy: &'static str,
    pub backend_count: usize,
    pub healthy_count: usize,
    pub total_requests: u64,
    pub backends: Vec<BackendStatus>,
}

impl StatusReport {
    pub fn collect(pool: &BackendPool) -> Self {
        let backends: Vec<BackendStatus> = pool
            .backends()
            .iter()
            .map(|b| BackendStatus::from(b.as_ref()))
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            strategy: pool.strategy().name(),
            backend_count: backends.len(),
            healthy_count: pool.healthy_subset().len(),
            total_requests: backends.iter().map(|b| b.total_requests).sum(),
            backends,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResetReport {
    pub revived: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport::collect(&state.pool))
}

pub async fn reset_health(State(state): State<AppState>) -> Json<ResetReport> {
    let revived = state.pool.reset_health();
    tracing::info!(revived, "Backend health reset by operator");
    Json(ResetReport { revived })
}
