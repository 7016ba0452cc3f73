//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses (bind, metrics, backends, discovery fallback)
//! - Validate value ranges (timeouts > 0, ports valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("backend address '{address}' is invalid: {reason}")]
    BackendAddress { address: String, reason: String },

    #[error("discovery.fallback '{address}' is invalid: {reason}")]
    FallbackAddress { address: String, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Parse an upstream address, requiring an absolute http URL with a host.
///
/// Upstream TLS is not supported, so https is rejected here rather than at
/// request time.
pub fn parse_backend_url(address: &str) -> Result<Url, String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(url)
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for backend in &config.backends {
        if let Err(reason) = parse_backend_url(&backend.address) {
            errors.push(ValidationError::BackendAddress {
                address: backend.address.clone(),
                reason,
            });
        }
    }

    let discovery = &config.discovery;
    if discovery.enabled {
        if let Err(reason) = parse_backend_url(&discovery.fallback) {
            errors.push(ValidationError::FallbackAddress {
                address: discovery.fallback.clone(),
                reason,
            });
        }
        if discovery.port == 0 {
            errors.push(ValidationError::Zero("discovery.port"));
        }
        if discovery.timeout_secs == 0 {
            errors.push(ValidationError::Zero("discovery.timeout_secs"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }

    if config.admin.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        errors.push(ValidationError::Empty("admin.api_key"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
