//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives with a client identity
//!     → pool.rs (take the registry lock, compute the healthy subset)
//!     → Apply the configured algorithm (strategy.rs):
//!         - round_robin.rs (rotate through backends)
//!         - random.rs (uniform pick)
//!         - weighted.rs (weight-proportional rotation)
//!         - least_conn.rs (pick backend with fewest connections)
//!         - ip_hash.rs (hash client identity onto the subset)
//!     → backend.rs (connection guard brackets the forwarded request)
//!     → Return backend handle or NoHealthyBackend
//! ```
//!
//! # Design Decisions
//! - One algorithm per pool, fixed at construction
//! - Cursor state lives in the selector and only moves under the pool's write lock
//! - Unhealthy backends excluded from selection, but never removed
//! - Per-backend counters use their own locks, independent of the pool lock

pub mod backend;
pub mod ip_hash;
pub mod least_conn;
pub mod pool;
pub mod random;
pub mod round_robin;
pub mod strategy;
pub mod weighted;

use std::sync::Arc;
use thiserror::Error;

pub use backend::{Backend, BackendSnapshot, ConnectionGuard};
pub use pool::BackendPool;
pub use strategy::{Selector, Strategy};

/// A backend selection algorithm.
///
/// Implementations receive only healthy backends. `None` is returned only
/// for an empty slice.
pub trait LoadBalancer: std::fmt::Debug + Send + Sync {
    fn next_server(&mut self, backends: &[Arc<Backend>], client: &str) -> Option<Arc<Backend>>;
}

/// Errors returned by backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Every registered backend is unhealthy (or none are registered).
    #[error("no healthy backends available")]
    NoHealthyBackend,
}
