//! Structured logging.
//!
//! `RUST_LOG` wins when set; otherwise `DEFAULT_LEVEL` applies to this
//! crate and to `tower_http`. The subscriber is installed before the
//! configuration is read so that configuration warnings are not lost.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LEVEL: &str = "info";

/// Default filter directive for a given level.
pub fn default_directive(log_level: &str) -> String {
    format!("lb_gateway={log_level},tower_http={log_level}")
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(log_level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
