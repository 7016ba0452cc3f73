//! Response handling.
//!
//! # Responsibilities
//! - Stream backend responses back to the client
//! - Keep the backend's connection guard alive until the body is finished
//! - Map selection and transport failures to status codes

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use hyper::body::Incoming;

use crate::http::request::strip_hop_by_hop;
use crate::load_balancer::ConnectionGuard;

/// Wrap an upstream body so `guard` is released when streaming ends or the
/// client goes away.
pub fn guarded_body(body: Incoming, guard: ConnectionGuard) -> Body {
    let stream = Body::new(body).into_data_stream().map(move |chunk| {
        let _held = &guard;
        chunk
    });
    Body::from_stream(stream)
}

/// Convert an upstream response for the client.
pub fn from_upstream(response: hyper::Response<Incoming>, guard: ConnectionGuard) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, guarded_body(body, guard))
}

pub fn no_healthy_backend() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "No healthy backends available").into_response()
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Backend temporarily unavailable").into_response()
}

pub fn invalid_backend() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Invalid backend URL").into_response()
}
