//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, parse & deserialize)
//!     → cli.rs (LB_STRATEGY / LB_ADMIN_API_KEY env, --strategy / --bind / --admin-key flags)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The strategy is read once; changing it requires a restart

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::ConfigError;
pub use schema::{
    AdminConfig, BackendConfig, DiscoveryConfig, GatewayConfig, ListenerConfig, LoadBalancingConfig,
    ObservabilityConfig, TimeoutConfig,
};
