//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, proxy handler)
//!     → request.rs (client identity, URI rewrite, forwarding headers)
//!     → [load balancer picks backend]
//!     → response.rs (stream body back, release connection guard)
//!     → Send to client
//!
//! /ping, /health
//!     → status.rs
//! /admin/reset-health
//!     → auth.rs (bearer token) → status.rs
//! ```

pub mod auth;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use server::{AppState, HttpServer};
