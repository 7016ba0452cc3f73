//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use lb_gateway::config::GatewayConfig;
use lb_gateway::discovery::DnsResolver;
use lb_gateway::lifecycle::{Shutdown, startup};
use lb_gateway::load_balancer::{BackendPool, Strategy};
use lb_gateway::HttpServer;
use std::sync::Arc;

/// Read until the end of the request head so closing the socket never
/// resets a connection with unread data.
async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Start a mock backend that answers every request with `200 OK` and `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        read_request_head(&mut socket).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address on which nothing is listening.
#[allow(dead_code)]
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A pool over `addrs`, registered in order with the given weights.
pub fn pool(strategy: Strategy, addrs: &[(SocketAddr, u32)]) -> Arc<BackendPool> {
    let pool = Arc::new(BackendPool::new(strategy));
    for (addr, weight) in addrs {
        pool.add_backend(format!("http://{}", addr).parse().unwrap(), *weight);
    }
    pool
}

/// Bearer token the test gateway requires on `/admin/*`.
#[allow(dead_code)]
pub const ADMIN_API_KEY: &str = "test-admin-key";

/// Gateway configuration for tests: no discovery, no metrics listener,
/// admin endpoints enabled with [`ADMIN_API_KEY`].
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.discovery.enabled = false;
    config.observability.metrics_enabled = false;
    config.admin.api_key = Some(ADMIN_API_KEY.to_string());
    config
}

/// Start the gateway in front of `pool`. Returns its address and the
/// shutdown handle that stops it.
pub async fn start_gateway(pool: Arc<BackendPool>) -> (SocketAddr, Shutdown) {
    start_gateway_with(test_config(), pool).await
}

/// Start the gateway in front of `pool` with an explicit configuration.
pub async fn start_gateway_with(config: GatewayConfig, pool: Arc<BackendPool>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config, pool);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Start the gateway from configuration, the way the binary does.
#[allow(dead_code)]
pub async fn start_gateway_from_config(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let pool = startup::build_pool(&config, &DnsResolver).await;
    start_gateway_with(config, pool).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
