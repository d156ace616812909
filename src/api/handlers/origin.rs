//! Request origin used in the throttle key.

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Client address from common proxy headers.
pub fn forwarded_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve the caller origin. Proxy headers count only when
/// `trust_proxy_headers` is set.
pub fn request_origin(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_client_ip(headers) {
            return ip;
        }
    }
    peer.map_or_else(|| UNKNOWN_ORIGIN.to_string(), |addr| addr.ip().to_string())
}
