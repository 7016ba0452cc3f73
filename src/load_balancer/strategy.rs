//! Strategy selection.
//!
//! `Strategy` is the configuration-facing enumeration; `Selector` is the
//! closed set of algorithm implementations it maps to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::load_balancer::{
    LoadBalancer,
    backend::Backend,
    ip_hash::IpHash,
    least_conn::LeastConnections,
    random::Random,
    round_robin::RoundRobin,
    weighted::WeightedRoundRobin,
};

/// Load balancing strategy, fixed for the lifetime of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Strategy {
    #[default]
    RoundRobin,
    Random,
    WeightedRoundRobin,
    LeastConnections,
    IpHash,
}

impl Strategy {
    /// Parse a configuration value. Unknown values fall back to round robin.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "roundrobin" | "round-robin" | "rr" => Strategy::RoundRobin,
            "random" | "rand" => Strategy::Random,
            "weighted" | "weightedroundrobin" | "weighted-round-robin" | "wrr" => {
                Strategy::WeightedRoundRobin
            }
            "leastconnections" | "least-connections" | "lc" => Strategy::LeastConnections,
            "iphash" | "ip-hash" | "hash" => Strategy::IpHash,
            _ => {
                tracing::warn!(strategy = %value, "Unknown strategy, defaulting to Round Robin");
                Strategy::RoundRobin
            }
        }
    }

    /// Canonical configuration value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "roundrobin",
            Strategy::Random => "random",
            Strategy::WeightedRoundRobin => "weighted",
            Strategy::LeastConnections => "leastconnections",
            Strategy::IpHash => "iphash",
        }
    }

    /// Human-readable name for status output.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "Round Robin",
            Strategy::Random => "Random",
            Strategy::WeightedRoundRobin => "Weighted Round Robin",
            Strategy::LeastConnections => "Least Connections",
            Strategy::IpHash => "IP Hash",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Strategy {
    fn from(value: String) -> Self {
        Strategy::parse(&value)
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// The selector instance backing a pool.
#[derive(Debug)]
pub enum Selector {
    RoundRobin(RoundRobin),
    Random(Random),
    WeightedRoundRobin(WeightedRoundRobin),
    LeastConnections(LeastConnections),
    IpHash(IpHash),
}

impl Selector {
    pub fn new(strategy: Strategy) -> Self {
        match strategy {
            Strategy::RoundRobin => Selector::RoundRobin(RoundRobin::new()),
            Strategy::Random => Selector::Random(Random::new()),
            Strategy::WeightedRoundRobin => Selector::WeightedRoundRobin(WeightedRoundRobin::new()),
            Strategy::LeastConnections => Selector::LeastConnections(LeastConnections::new()),
            Strategy::IpHash => Selector::IpHash(IpHash::new()),
        }
    }
}

impl LoadBalancer for Selector {
    fn next_server(&mut self, backends: &[Arc<Backend>], client: &str) -> Option<Arc<Backend>> {
        match self {
            Selector::RoundRobin(s) => s.next_server(backends, client),
            Selector::Random(s) => s.next_server(backends, client),
            Selector::WeightedRoundRobin(s) => s.next_server(backends, client),
            Selector::LeastConnections(s) => s.next_server(backends, client),
            Selector::IpHash(s) => s.next_server(backends, client),
        }
    }
}
