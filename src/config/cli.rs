//! Command line arguments and the layering of configuration sources.
//!
//! Precedence, highest first: `--strategy` flag, `LB_STRATEGY`, config
//! file, built-in defaults. `--bind` and `--admin-key` (`LB_ADMIN_API_KEY`)
//! likewise override the file.

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::GatewayConfig;
use crate::config::validation::validate_config;
use crate::load_balancer::Strategy;

#[derive(Debug, Parser)]
#[command(name = "lb-gateway")]
#[command(version, about = "HTTP load balancing gateway", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Load balancing strategy (roundrobin, random, weighted, leastconnections, iphash).
    #[arg(short, long, env = "LB_STRATEGY")]
    pub strategy: Option<String>,

    /// Listener bind address, overriding the config file.
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Bearer token that enables the admin endpoints.
    #[arg(long, env = "LB_ADMIN_API_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,
}

impl Cli {
    /// Build the effective configuration.
    pub fn resolve(&self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(strategy) = self.strategy.as_deref().filter(|s| !s.is_empty()) {
            config.load_balancing.strategy = Strategy::parse(strategy);
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(key) = &self.admin_key {
            config.admin.api_key = Some(key.clone());
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
