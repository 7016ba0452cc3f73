//! HTTP load balancing gateway library.

pub mod config;
pub mod discovery;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Backend, BackendPool, SelectError, Strategy};
