//! Backend discovery.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     discovery.service (DNS name)
//!     → Resolve (tokio lookup_host, bounded by timeout)
//!     → one URL per address: http://{ip}:{port}
//!     → on error, timeout or empty answer: [discovery.fallback]
//! ```
//!
//! # Design Decisions
//! - Runs once; the backend set is not refreshed while running
//! - Fail-open: a failed lookup degrades capacity but never stops startup
//! - The resolver is a trait so tests can script DNS answers

use std::future::Future;
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::config::validation::parse_backend_url;

/// Name resolution used by discovery.
pub trait Resolve {
    fn resolve(&self, host: &str, port: u16) -> impl Future<Output = io::Result<Vec<IpAddr>>> + Send;
}

/// Resolver backed by the system's DNS configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

impl Resolve for DnsResolver {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        Ok(ips)
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("lookup of '{service}' failed: {source}")]
    Lookup { service: String, source: io::Error },

    #[error("lookup of '{service}' timed out after {secs}s")]
    Timeout { service: String, secs: u64 },

    #[error("lookup of '{0}' returned no addresses")]
    Empty(String),

    #[error("could not build backend URL: {0}")]
    Url(String),
}

/// Build the URL for one discovered instance.
pub fn instance_url(ip: IpAddr, port: u16) -> Result<Url, DiscoveryError> {
    let host = match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    parse_backend_url(&format!("http://{host}:{port}")).map_err(DiscoveryError::Url)
}

/// Resolve the configured service to backend URLs. Errors are returned as-is.
pub async fn lookup<R: Resolve>(resolver: &R, config: &DiscoveryConfig) -> Result<Vec<Url>, DiscoveryError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let ips = match tokio::time::timeout(timeout, resolver.resolve(&config.service, config.port)).await {
        Ok(Ok(ips)) => ips,
        Ok(Err(source)) => {
            return Err(DiscoveryError::Lookup {
                service: config.service.clone(),
                source,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::Timeout {
                service: config.service.clone(),
                secs: config.timeout_secs,
            })
        }
    };

    if ips.is_empty() {
        return Err(DiscoveryError::Empty(config.service.clone()));
    }

    ips.into_iter()
        .map(|ip| instance_url(ip, config.port))
        .collect()
}

/// Resolve the configured service, falling back to the single configured
/// address on any failure.
pub async fn discover<R: Resolve>(resolver: &R, config: &DiscoveryConfig) -> Vec<Url> {
    match lookup(resolver, config).await {
        Ok(urls) => {
            for url in &urls {
                tracing::info!(backend = %url, "Discovered backend");
            }
            urls
        }
        Err(e) => {
            tracing::warn!(error = %e, fallback = %config.fallback, "Backend discovery failed, using fallback");
            match parse_backend_url(&config.fallback) {
                Ok(url) => vec![url],
                Err(reason) => {
                    tracing::error!(fallback = %config.fallback, reason = %reason, "Fallback backend address is invalid");
                    Vec::new()
                }
            }
        }
    }
}
