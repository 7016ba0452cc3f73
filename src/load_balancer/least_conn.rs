//! Least Connections load balancing strategy.

use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Least connections selector.
/// Selects the backend with the minimum number of active connections.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&mut self, backends: &[Arc<Backend>], _client: &str) -> Option<Arc<Backend>> {
        // min_by_key keeps the first minimum, so ties go to the earliest backend
        backends
            .iter()
            .min_by_key(|b| b.active_connections())
            .cloned()
    }
}
