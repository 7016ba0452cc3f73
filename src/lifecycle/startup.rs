//! Startup orchestration.
//!
//! Builds the backend pool: discovered backends first, in resolver order,
//! then the statically configured ones.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::config::validation::parse_backend_url;
use crate::discovery::{self, Resolve};
use crate::load_balancer::BackendPool;

pub async fn build_pool<R: Resolve>(config: &GatewayConfig, resolver: &R) -> Arc<BackendPool> {
    let pool = Arc::new(BackendPool::new(config.load_balancing.strategy));

    if config.discovery.enabled {
        for url in discovery::discover(resolver, &config.discovery).await {
            pool.add_backend(url, config.discovery.weight);
        }
    }

    for backend in &config.backends {
        match parse_backend_url(&backend.address) {
            Ok(url) => {
                pool.add_backend(url, backend.weight);
            }
            Err(reason) => {
                tracing::warn!(address = %backend.address, reason = %reason, "Skipping invalid backend address");
            }
        }
    }

    if pool.is_empty() {
        tracing::warn!("No backends registered; every request will receive 503");
    }

    pool
}
