//! Random load balancing strategy.

use rand::Rng;
use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Uniform random selector. Carries no state between calls.
#[derive(Debug, Default)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for Random {
    fn next_server(&mut self, backends: &[Arc<Backend>], _client: &str) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let index = rand::thread_rng().gen_range(0..backends.len());
        Some(backends[index].clone())
    }
}
