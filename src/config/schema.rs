//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::load_balancer::Strategy;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Strategy selection.
    pub load_balancing: LoadBalancingConfig,

    /// Startup DNS discovery of the backend group.
    pub discovery: DiscoveryConfig,

    /// Backends registered in addition to the discovered ones.
    pub backends: Vec<BackendConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator endpoints.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Load balancing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoadBalancingConfig {
    /// One of roundrobin, random, weighted, leastconnections, iphash.
    /// Unknown values fall back to roundrobin.
    pub strategy: Strategy,
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Resolve `service` at startup.
    pub enabled: bool,

    /// DNS name of the backend group.
    pub service: String,

    /// Port every discovered instance listens on.
    pub port: u16,

    /// DNS lookup timeout in seconds.
    pub timeout_secs: u64,

    /// Single backend registered when resolution fails or returns nothing.
    pub fallback: String,

    /// Weight given to each discovered backend.
    pub weight: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service: "cats-api".to_string(),
            port: 8080,
            timeout_secs: 5,
            fallback: "http://cats-api:8080".to_string(),
            weight: 1,
        }
    }
}

/// Static backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend URL (e.g., "http://127.0.0.1:3000").
    pub address: String,

    /// Weight for weighted load balancing (default: 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by `/admin/*`. The admin routes are not
    /// mounted when unset, so those paths are proxied like any other.
    pub api_key: Option<String>,
}
