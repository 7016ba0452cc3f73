//! Request handling and transformation.
//!
//! # Responsibilities
//! - Derive the client identity used for session affinity
//! - Rewrite the request URI onto the chosen backend
//! - Strip hop-by-hop headers and record the client in X-Forwarded-For

use axum::body::Body;
use axum::http::{self, HeaderMap, HeaderName, HeaderValue, Request, Uri, Version, header};
use std::net::{IpAddr, SocketAddr};
use url::{Position, Url};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Client identity: X-Forwarded-For, then X-Real-IP, then the peer address.
///
/// Header values are used verbatim; a multi-hop X-Forwarded-For list is
/// hashed as a whole.
pub fn client_identity(headers: &HeaderMap, peer: SocketAddr) -> String {
    [X_FORWARDED_FOR, X_REAL_IP]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.to_string())
}

/// Join two URL paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Target URI on `backend` for an incoming request URI.
///
/// The backend's base path is prefixed to the request path, and both query
/// strings are kept.
pub fn upstream_uri(backend: &Url, inbound: &Uri) -> Result<Uri, http::Error> {
    let path = join_paths(backend.path(), inbound.path());
    let query = match (backend.query().filter(|q| !q.is_empty()), inbound.query()) {
        (Some(base), Some(extra)) if !extra.is_empty() => Some(format!("{base}&{extra}")),
        (Some(base), _) => Some(base.to_string()),
        (None, extra) => extra.map(str::to_string),
    };
    let path_and_query = match query {
        Some(q) => format!("{path}?{q}"),
        None => path,
    };

    Uri::builder()
        .scheme(backend.scheme())
        .authority(&backend[Position::BeforeHost..Position::AfterPort])
        .path_and_query(path_and_query)
        .build()
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in &named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append the peer IP to X-Forwarded-For, keeping any earlier hops.
pub fn append_forwarded_for(headers: &mut HeaderMap, peer: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        peer.to_string()
    } else {
        format!("{}, {}", prior.join(", "), peer)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Turn an inbound request into the request sent to `backend`.
pub fn upstream_request(
    request: Request<Body>,
    backend: &Url,
    peer: SocketAddr,
) -> Result<Request<Body>, http::Error> {
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream_uri(backend, &parts.uri)?;
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, peer.ip());

    Ok(Request::from_parts(parts, body))
}
