//! HTTP load balancing gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────┐
//!                        │                   GATEWAY                       │
//!    Client Request      │  ┌─────────┐    ┌──────────────┐               │
//!    ────────────────────┼─▶│  http   │───▶│ BackendPool  │               │
//!                        │  │ server  │    │  + selector  │               │
//!                        │  └────┬────┘    └──────┬───────┘               │
//!                        │       │                │ healthy subset        │
//!                        │       │                ▼                       │
//!    Client Response     │  ┌────▼────┐    ┌──────────────┐               │
//!    ◀───────────────────┼──│response │◀───│   backend    │◀──────────────┼──── Backend
//!                        │  │ stream  │    │ conn. guard  │               │     Server
//!                        │  └─────────┘    └──────────────┘               │
//!                        │                                                 │
//!                        │  config · discovery · observability · lifecycle │
//!                        └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use lb_gateway::config::Cli;
use lb_gateway::discovery::DnsResolver;
use lb_gateway::http::HttpServer;
use lb_gateway::lifecycle::{Shutdown, signals, startup};
use lb_gateway::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(logging::DEFAULT_LEVEL);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lb-gateway starting");

    let cli = Cli::parse();
    let config = cli.resolve()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.load_balancing.strategy,
        discovery = config.discovery.enabled,
        static_backends = config.backends.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let pool = startup::build_pool(&config, &DnsResolver).await;
    tracing::info!(
        backends = pool.len(),
        strategy = %pool.strategy(),
        "Load balancer ready"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, pool).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
