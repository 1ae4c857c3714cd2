//! Client IP resolution.
//!
//! Picks the best guess of the originating client address from forwarding
//! headers, falling back to the directly connected peer.
//!
//! # Resolution order
//! 1. `X-Forwarded-For`: first comma-separated entry, trimmed
//! 2. `X-Real-Ip`: verbatim
//! 3. Peer address with the port stripped, or the raw peer string if it does
//!    not split as `host:port`
//!
//! Forwarded values are taken on trust and not validated as IP addresses.

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Resolve the client IP for a request.
pub fn resolve(headers: &HeaderMap, peer: &str) -> String {
    if let Some(forwarded) = header_str(headers, X_FORWARDED_FOR) {
        let first = forwarded.split(',').next().unwrap_or(forwarded);
        return first.trim().to_string();
    }
    if let Some(real_ip) = header_str(headers, X_REAL_IP) {
        return real_ip.to_string();
    }
    match split_host_port(peer) {
        Some((host, _)) => host.to_string(),
        None => peer.to_string(),
    }
}

/// First value of `name`, if present, valid visible ASCII and non-empty.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Split `host:port` or `[host]:port` into its parts.
///
/// Returns `None` when there is no port separator, when an unbracketed host
/// contains further colons, or when the host is empty.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        (host, after.strip_prefix(':')?)
    } else {
        let (host, port) = addr.rsplit_once(':')?;
        if host.contains(':') {
            return None;
        }
        (host, port)
    };

    if host.is_empty() {
        return None;
    }
    Some((host, port))
}
