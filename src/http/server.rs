//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and status handlers
//! - Wire up middleware (tracing, timeout, request ID, request log)
//! - Guard the admin endpoints with a bearer token
//! - Bind server to listener and drain on shutdown
//! - Select a backend per request and forward to it
//! - Passive health: demote a backend on transport failure

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, Request, State},
    handler::Handler,
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::{auth, request, response, status};
use crate::load_balancer::BackendPool;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server routing across `pool`.
    pub fn new(config: GatewayConfig, pool: Arc<BackendPool>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState { pool, client };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/ping", get(status::get_status))
            .route("/health", get(status::get_status));

        // Other methods on the admin path still reach the backends.
        if let Some(api_key) = config.admin.api_key.as_deref() {
            let require_key = middleware::from_fn_with_state(Arc::<str>::from(api_key), auth::require_api_key);
            router = router.route(
                "/admin/reset-health",
                post(status::reset_health.layer(require_key)).fallback(proxy_handler),
            );
        } else {
            tracing::info!("admin.api_key not set, admin endpoints disabled");
        }

        router
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(middleware::from_fn(log_request)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Log every inbound request with its peer address.
async fn log_request(req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(
        peer = %peer,
        method = %req.method(),
        uri = %req.uri(),
        "New request"
    );
    next.run(req).await
}

/// Main proxy handler.
/// Selects a backend for the client, forwards the request, and streams the
/// response back.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
) -> Response {
    let start_time = Instant::now();
    let method = req.method().to_string();
    let client = request::client_identity(req.headers(), peer);

    // 1. Select Backend
    let backend = match state.pool.select(&client) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(client = %client, error = %e, "Rejecting request");
            metrics::record_no_healthy_backend();
            metrics::record_request(&method, 503, "none", start_time);
            return response::no_healthy_backend();
        }
    };
    let backend_addr = backend.address().to_string();
    metrics::record_selection(state.pool.strategy().as_str(), &backend_addr);

    tracing::debug!(client = %client, backend = %backend_addr, "Proxying request");

    // 2. Track the in-flight request until the response body is done
    let guard = backend.connect();

    let upstream = match request::upstream_request(req, backend.address(), peer) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(backend = %backend_addr, error = %e, "Invalid backend URL");
            metrics::record_request(&method, 500, &backend_addr, start_time);
            return response::invalid_backend();
        }
    };

    // 3. Forward
    match state.client.request(upstream).await {
        Ok(upstream_response) => {
            metrics::record_request(&method, upstream_response.status().as_u16(), &backend_addr, start_time);
            response::from_upstream(upstream_response, guard)
        }
        Err(e) => {
            tracing::error!(backend = %backend_addr, error = %e, "Proxy error");
            if backend.mark_unhealthy() {
                tracing::warn!(backend = %backend_addr, "Backend marked unhealthy");
                metrics::record_backend_health(&backend_addr, false);
            }
            metrics::record_request(&method, 502, &backend_addr, start_time);
            response::bad_gateway()
        }
    }
}
