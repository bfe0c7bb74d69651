//! Client identity extraction for rate limiting and click metadata.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP of a request.
///
/// When `behind_proxy` is set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise forwarding headers are ignored and the socket peer
/// address is used.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Option<String> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = real_ip {
            return Some(ip.to_string());
        }
    }

    peer.map(|addr| addr.ip().to_string())
}
