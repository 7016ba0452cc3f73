//! Backend pool (registry) management.
//!
//! # Responsibilities
//! - Own the ordered list of backends for the process lifetime
//! - Apply the configured load balancing algorithm to the healthy subset
//! - Serialize cursor updates so rotations visit each backend once per cycle

use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

use crate::load_balancer::{
    LoadBalancer, SelectError,
    backend::Backend,
    strategy::{Selector, Strategy},
};
use crate::observability::metrics;

#[derive(Debug)]
struct PoolState {
    /// Append-only; insertion order is discovery order.
    backends: Vec<Arc<Backend>>,
    selector: Selector,
}

/// Owns the backends and the strategy used to pick between them.
#[derive(Debug)]
pub struct BackendPool {
    strategy: Strategy,
    state: RwLock<PoolState>,
}

impl BackendPool {
    /// Create an empty pool using `strategy`.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            state: RwLock::new(PoolState {
                backends: Vec::new(),
                selector: Selector::new(strategy),
            }),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Register a new healthy backend. Duplicates are kept as separate entries.
    pub fn add_backend(&self, address: Url, weight: u32) -> Arc<Backend> {
        let backend = Arc::new(Backend::new(address, weight));
        self.state.write().backends.push(backend.clone());

        tracing::info!(address = %backend.address(), weight, "Added backend");
        metrics::record_backend_health(backend.address().as_str(), true);
        backend
    }

    /// Pick a backend for `client` among the currently healthy ones.
    ///
    /// Holds the pool's write lock for the whole computation so that cursor
    /// based strategies advance exactly once per call.
    pub fn select(&self, client: &str) -> Result<Arc<Backend>, SelectError> {
        let mut state = self.state.write();
        let PoolState { backends, selector } = &mut *state;

        let healthy = healthy_of(backends);
        if healthy.is_empty() {
            tracing::debug!(backend_count = backends.len(), "No healthy backends available");
            return Err(SelectError::NoHealthyBackend);
        }

        selector
            .next_server(&healthy, client)
            .ok_or(SelectError::NoHealthyBackend)
    }

    /// Backends currently eligible for selection, in registration order.
    pub fn healthy_subset(&self) -> Vec<Arc<Backend>> {
        healthy_of(&self.state.read().backends)
    }

    /// Every registered backend, healthy or not, in registration order.
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        self.state.read().backends.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Operator intervention: put every backend back into rotation.
    ///
    /// Returns the number of backends that were unhealthy.
    pub fn reset_health(&self) -> usize {
        let state = self.state.read();
        let mut revived = 0;
        for backend in &state.backends {
            if backend.mark_healthy() {
                revived += 1;
                metrics::record_backend_health(backend.address().as_str(), true);
                tracing::info!(address = %backend.address(), "Backend returned to rotation by operator");
            }
        }
        revived
    }
}

fn healthy_of(backends: &[Arc<Backend>]) -> Vec<Arc<Backend>> {
    backends.iter().filter(|b| b.is_healthy()).cloned().collect()
}
