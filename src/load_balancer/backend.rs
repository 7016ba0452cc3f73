//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track active connections (for Least Connections LB)
//! - Track lifetime request totals and the last routing decision
//! - Track health (healthy until a transport error demotes it)

use parking_lot::RwLock;
use std::ops::Deref;
use std::sync::Arc;
use std::time::SystemTime;
use url::Url;

/// Mutable per-backend state, guarded by the backend's own lock.
#[derive(Debug)]
struct BackendState {
    active_connections: usize,
    total_requests: u64,
    last_request_time: Option<SystemTime>,
    healthy: bool,
}

/// A consistent read of a backend's counters and health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSnapshot {
    pub active_connections: usize,
    pub total_requests: u64,
    pub last_request_time: Option<SystemTime>,
    pub healthy: bool,
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Where requests are forwarded (scheme, host, port, optional base path).
    address: Url,
    /// Capacity hint for weighted round robin.
    weight: u32,
    state: RwLock<BackendState>,
}

impl Backend {
    /// Create a new, healthy backend with zeroed counters.
    pub fn new(address: Url, weight: u32) -> Self {
        Self {
            address,
            weight,
            state: RwLock::new(BackendState {
                active_connections: 0,
                total_requests: 0,
                last_request_time: None,
                healthy: true,
            }),
        }
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Get the current number of active connections.
    pub fn active_connections(&self) -> usize {
        self.state.read().active_connections
    }

    /// Record a routing decision: one more in-flight request.
    pub fn increment_connections(&self) {
        let mut state = self.state.write();
        state.active_connections += 1;
        state.total_requests += 1;
        state.last_request_time = Some(SystemTime::now());
    }

    /// Release an in-flight request. Saturates at zero.
    pub fn decrement_connections(&self) {
        let mut state = self.state.write();
        state.active_connections = state.active_connections.saturating_sub(1);
    }

    /// Read all counters and the health flag under one shared lock.
    pub fn snapshot(&self) -> BackendSnapshot {
        let state = self.state.read();
        BackendSnapshot {
            active_connections: state.active_connections,
            total_requests: state.total_requests,
            last_request_time: state.last_request_time,
            healthy: state.healthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state.read().healthy
    }

    /// Exclude this backend from selection.
    ///
    /// Returns `true` only for the call that performed the transition, so
    /// callers can log the demotion once.
    pub fn mark_unhealthy(&self) -> bool {
        let mut state = self.state.write();
        std::mem::replace(&mut state.healthy, false)
    }

    /// Put this backend back into rotation. Returns `true` if it was unhealthy.
    pub fn mark_healthy(&self) -> bool {
        let mut state = self.state.write();
        !std::mem::replace(&mut state.healthy, true)
    }

    /// Increment the connection count and return a guard that decrements it on drop.
    pub fn connect(self: &Arc<Self>) -> ConnectionGuard {
        self.increment_connections();
        ConnectionGuard {
            backend: self.clone(),
        }
    }
}

/// A RAII guard that manages the active connection count.
#[derive(Debug)]
pub struct ConnectionGuard {
    backend: Arc<Backend>,
}

impl Deref for ConnectionGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.backend.decrement_connections();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Arc<Backend> {
        Arc::new(Backend::new("http://127.0.0.1:8080".parse().unwrap(), 1))
    }

    #[test]
    fn test_connection_tracking() {
        let b = backend();

        let initial = b.snapshot();
        assert_eq!(initial.active_connections, 0);
        assert_eq!(initial.total_requests, 0);
        assert!(initial.last_request_time.is_none());

        b.increment_connections();
        let after_one = b.snapshot();
        assert_eq!(after_one.active_connections, 1);
        assert_eq!(after_one.total_requests, 1);
        assert!(after_one.last_request_time.is_some());

        b.increment_connections();
        b.increment_connections();
        b.decrement_connections();
        let s = b.snapshot();
        assert_eq!(s.active_connections, 2);
        assert_eq!(s.total_requests, 3);
    }

    #[test]
    fn test_decrement_never_below_zero() {
        let b = backend();
        b.increment_connections();
        for _ in 0..5 {
            b.decrement_connections();
        }
        assert_eq!(b.active_connections(), 0);
        assert_eq!(b.snapshot().total_requests, 1);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let b = backend();
        {
            let guard = b.connect();
            assert_eq!(guard.active_connections(), 1);
            let _second = b.connect();
            assert_eq!(b.active_connections(), 2);
        }
        assert_eq!(b.active_connections(), 0);
        assert_eq!(b.snapshot().total_requests, 2);
    }

    #[test]
    fn test_mark_unhealthy_is_idempotent() {
        let b = backend();
        assert!(b.is_healthy());
        assert!(b.mark_unhealthy());
        assert!(!b.mark_unhealthy());
        assert!(!b.is_healthy());

        assert!(b.mark_healthy());
        assert!(!b.mark_healthy());
        assert!(b.is_healthy());
    }

    #[test]
    fn test_snapshot_includes_health() {
        let b = backend();
        b.increment_connections();
        b.mark_unhealthy();

        let s = b.snapshot();
        assert!(!s.healthy);
        assert_eq!(s.active_connections, 1);
        assert_eq!(s.total_requests, 1);

        b.mark_healthy();
        assert!(b.snapshot().healthy);
    }
}
