//! IP hash load balancing strategy.
//!
//! Maps a client identity onto the healthy subset with 32-bit FNV-1a.
//! Affinity holds only while the subset's size and order stay the same;
//! a backend going unhealthy remaps clients.

use std::sync::Arc;
use crate::load_balancer::{LoadBalancer, backend::Backend};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Default)]
pub struct IpHash;

impl IpHash {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for IpHash {
    fn next_server(&mut self, backends: &[Arc<Backend>], client: &str) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let index = fnv1a_32(client.as_bytes()) as usize % backends.len();
        Some(backends[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Arc<Backend>> {
        (1..=3)
            .map(|i| Arc::new(Backend::new(format!("http://backend{}:8080", i).parse().unwrap(), 1)))
            .collect()
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_same_client_same_backend() {
        let mut lb = IpHash::new();
        let backends = backends();

        let first = lb.next_server(&backends, "192.168.1.10").unwrap();
        for _ in 0..100 {
            let again = lb.next_server(&backends, "192.168.1.10").unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
    }

    #[test]
    fn test_mapping_is_hash_mod_len() {
        let mut lb = IpHash::new();
        let backends = backends();

        for ip in ["10.0.0.1", "10.0.0.2", "172.16.0.9", "192.168.1.100"] {
            let expected = fnv1a_32(ip.as_bytes()) as usize % backends.len();
            let picked = lb.next_server(&backends, ip).unwrap();
            assert!(Arc::ptr_eq(&picked, &backends[expected]), "ip {ip}");
        }
    }
}
