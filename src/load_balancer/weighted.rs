//! Weighted round-robin load balancing strategy.
//!
//! The cursor walks a virtual cycle of length `sum(weights)`. Each call
//! advances it by one and picks the backend whose cumulative weight range
//! contains it, so a backend of weight `w` is chosen `w` times per cycle.

use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend, round_robin::RoundRobin};

#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    cursor: u64,
    /// Used when every healthy backend has weight zero.
    fallback: RoundRobin,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for WeightedRoundRobin {
    fn next_server(&mut self, backends: &[Arc<Backend>], client: &str) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let total_weight: u64 = backends.iter().map(|b| u64::from(b.weight())).sum();
        if total_weight == 0 {
            return self.fallback.next_server(backends, client);
        }

        self.cursor = (self.cursor + 1) % total_weight;

        let mut cumulative = 0u64;
        for backend in backends {
            cumulative += u64::from(backend.weight());
            if self.cursor < cumulative {
                return Some(backend.clone());
            }
        }

        // Unreachable while cursor < total_weight.
        Some(backends[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted(weights: &[u32]) -> Vec<Arc<Backend>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| Arc::new(Backend::new(format!("http://backend{}:8080", i + 1).parse().unwrap(), *w)))
            .collect()
    }

    fn counts(lb: &mut WeightedRoundRobin, backends: &[Arc<Backend>], calls: usize) -> Vec<usize> {
        let mut counts = vec![0; backends.len()];
        for _ in 0..calls {
            let picked = lb.next_server(backends, "").unwrap();
            let idx = backends.iter().position(|b| Arc::ptr_eq(b, &picked)).unwrap();
            counts[idx] += 1;
        }
        counts
    }

    #[test]
    fn test_weights_1_3_2_over_two_cycles() {
        let mut lb = WeightedRoundRobin::new();
        let backends = weighted(&[1, 3, 2]);
        assert_eq!(counts(&mut lb, &backends, 12), vec![2, 6, 4]);
    }

    #[test]
    fn test_any_window_of_one_cycle_is_proportional() {
        let mut lb = WeightedRoundRobin::new();
        let backends = weighted(&[2, 1, 4]);

        // Skip into the middle of a cycle; any full-cycle window must still match.
        for _ in 0..3 {
            lb.next_server(&backends, "");
        }
        assert_eq!(counts(&mut lb, &backends, 7), vec![2, 1, 4]);
        assert_eq!(counts(&mut lb, &backends, 7), vec![2, 1, 4]);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let mut lb = WeightedRoundRobin::new();
        let backends = weighted(&[0, 2]);
        assert_eq!(counts(&mut lb, &backends, 10), vec![0, 10]);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_round_robin() {
        let mut lb = WeightedRoundRobin::new();
        let backends = weighted(&[0, 0, 0]);
        assert_eq!(counts(&mut lb, &backends, 9), vec![3, 3, 3]);
    }
}
