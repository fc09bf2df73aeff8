use std::net::SocketAddr;

use axum::http::{HeaderMap, header};

pub const X_REAL_IP: &str = "x-real-ip";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub fn get_header(headers: &HeaderMap, key: impl header::AsHeaderName) -> Option<String> {
    if let Some(header) = headers.get(key) {
        if let Ok(header) = header.to_str() {
            return Some(header.to_string());
        }
    }
    None
}

/// Address of the requesting client: `X-Real-IP`, then the first
/// `X-Forwarded-For` entry, then the TCP peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(ip) = get_header(headers, X_REAL_IP) {
        let ip = ip.trim();
        if !ip.is_empty() {
            debug!("client ip from X-Real-IP: {}", ip);
            return ip.to_string();
        }
    }
    if let Some(forwarded) = get_header(headers, X_FORWARDED_FOR) {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
            debug!("client ip from X-Forwarded-For: {}", first);
            return first.to_string();
        }
    }
    debug!("client ip from peer address: {}", peer);
    peer.ip().to_string()
}
