//! Who sent a request, for log records.

use std::fmt;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::request::Parts;

const FORWARDED_FOR: &str = "x-forwarded-for";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// The client address and scheme of a request.
///
/// Behind a reverse proxy the socket peer is the proxy itself, so the
/// `X-Forwarded-For` / `X-Forwarded-Proto` headers are used instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub addr: String,
    pub scheme: String,
}

impl Peer {
    pub fn from_parts(parts: &Parts, behind_proxy: bool) -> Self {
        let socket = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string());

        if behind_proxy {
            let forwarded = header(parts, FORWARDED_FOR)
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            let scheme = header(parts, FORWARDED_PROTO)
                .map(|v| v.trim().to_ascii_lowercase())
                .unwrap_or_else(|| "http".to_string());
            return Peer {
                addr: forwarded
                    .or(socket)
                    .unwrap_or_else(|| "unknown".to_string()),
                scheme,
            };
        }

        Peer {
            addr: socket.unwrap_or_else(|| "unknown".to_string()),
            scheme: "http".to_string(),
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.addr)
    }
}
