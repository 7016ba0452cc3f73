//! Round-robin load balancing strategy.

use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

/// Round-robin selector.
/// Stores an internal cursor to rotate through backends.
///
/// The cursor keeps counting when the healthy subset shrinks or grows, so
/// positions are remapped by the modulo rather than replayed from the start.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&mut self, backends: &[Arc<Backend>], _client: &str) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let backend = &backends[self.cursor % backends.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Some(backend.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn backends(n: usize) -> Vec<Arc<Backend>> {
        (0..n)
            .map(|i| Arc::new(Backend::new(format!("http://127.0.0.1:{}", 8080 + i).parse().unwrap(), 1)))
            .collect()
    }

    #[test]
    fn test_round_robin() {
        let mut lb = RoundRobin::new();
        let backends = backends(2);

        let s1 = lb.next_server(&backends, "").unwrap();
        assert_eq!(s1.address(), backends[0].address());

        let s2 = lb.next_server(&backends, "").unwrap();
        assert_eq!(s2.address(), backends[1].address());

        let s3 = lb.next_server(&backends, "").unwrap();
        assert_eq!(s3.address(), backends[0].address());
    }

    #[test]
    fn test_round_robin_even_distribution() {
        for (n, k) in [(6, 3), (10, 3), (7, 4), (1, 2)] {
            let mut lb = RoundRobin::new();
            let backends = backends(k);
            let mut counts: HashMap<String, usize> = HashMap::new();

            for _ in 0..n {
                let b = lb.next_server(&backends, "").unwrap();
                *counts.entry(b.address().to_string()).or_default() += 1;
            }

            for b in &backends {
                let count = counts.get(b.address().as_str()).copied().unwrap_or(0);
                assert!(count == n / k || count == n.div_ceil(k), "n={n} k={k} count={count}");
            }
        }
    }

    #[test]
    fn test_empty_subset() {
        let mut lb = RoundRobin::new();
        assert!(lb.next_server(&[], "").is_none());
    }
}
