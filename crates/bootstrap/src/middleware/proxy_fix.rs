//! Proxy header normalization.
//!
//! Behind a reverse proxy the connection peer is the proxy itself. This
//! middleware restores what the original client sent from the
//! `X-Forwarded-For`, `X-Forwarded-Proto` and `X-Forwarded-Host` headers,
//! trusting only the last `trusted_proxies` hops of the forwarding chain.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::HOST, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use common::DEFAULT_TRUSTED_PROXIES;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Proxy fix configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyFix {
    pub trusted_proxies: usize,
}

impl Default for ProxyFix {
    fn default() -> Self {
        Self {
            trusted_proxies: DEFAULT_TRUSTED_PROXIES,
        }
    }
}

/// The request as the original client made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin {
    pub ip: Option<IpAddr>,
    pub scheme: String,
    pub host: Option<String>,
}

/// Connection values before the rewrite.
#[derive(Debug, Clone)]
pub struct ProxiedConnection {
    pub peer: Option<SocketAddr>,
    pub host: Option<HeaderValue>,
}

impl ProxyFix {
    /// Rewrite `request` in place.
    ///
    /// Replaces the `ConnectInfo` peer address and the `Host` header, and
    /// records both a [`ClientOrigin`] and the [`ProxiedConnection`] it
    /// replaced as request extensions.
    pub fn apply<B>(&self, request: &mut axum::http::Request<B>) {
        let headers = request.headers();

        let client_ip = self.client_ip(headers);
        let forwarded_host = first_value(headers, X_FORWARDED_HOST);
        let scheme = first_value(headers, X_FORWARDED_PROTO)
            .map(|s| s.to_ascii_lowercase())
            .or_else(|| request.uri().scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());
        let original_host = headers.get(HOST).cloned();
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        if let (Some(ip), Some(peer)) = (client_ip, peer) {
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::new(ip, peer.port())));
        }

        if let Some(value) = forwarded_host
            .as_deref()
            .and_then(|h| HeaderValue::from_str(h).ok())
        {
            request.headers_mut().insert(HOST, value);
        }

        let host = forwarded_host.or_else(|| {
            original_host
                .as_ref()
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        });

        request.extensions_mut().insert(ClientOrigin {
            ip: client_ip.or(peer.map(|p| p.ip())),
            scheme,
            host,
        });
        request.extensions_mut().insert(ProxiedConnection {
            peer,
            host: original_host,
        });
    }

    /// The address appended by the outermost trusted proxy.
    fn client_ip(&self, headers: &HeaderMap) -> Option<IpAddr> {
        if self.trusted_proxies == 0 {
            return None;
        }

        let chain: Vec<&str> = headers
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        chain
            .len()
            .checked_sub(self.trusted_proxies)
            .and_then(|idx| chain[idx].parse().ok())
    }
}

fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Middleware entry point.
pub async fn proxy_fix(
    State(config): State<ProxyFix>,
    mut request: Request,
    next: Next,
) -> Response {
    config.apply(&mut request);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/posts?page=2");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut request = builder.body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 41000))));
        request
    }

    fn peer(request: &Request<()>) -> SocketAddr {
        request.extensions().get::<ConnectInfo<SocketAddr>>().unwrap().0
    }

    #[test]
    fn test_restores_client_values() {
        let mut req = request(&[
            ("host", "soconn.internal"),
            ("x-forwarded-for", "203.0.113.7"),
            ("x-forwarded-proto", "https"),
            ("x-forwarded-host", "soconn.example.com"),
        ]);

        ProxyFix::default().apply(&mut req);

        assert_eq!(peer(&req), SocketAddr::from(([203, 0, 113, 7], 41000)));
        assert_eq!(req.headers()[HOST], "soconn.example.com");

        let origin = req.extensions().get::<ClientOrigin>().unwrap();
        assert_eq!(origin.scheme, "https");
        assert_eq!(origin.host.as_deref(), Some("soconn.example.com"));

        let original = req.extensions().get::<ProxiedConnection>().unwrap();
        assert_eq!(original.peer, Some(SocketAddr::from(([10, 0, 0, 2], 41000))));
        assert_eq!(original.host.as_ref().unwrap(), "soconn.internal");
    }

    #[test]
    fn test_trusts_only_the_last_hop() {
        let mut req = request(&[("x-forwarded-for", "1.1.1.1, 198.51.100.9")]);
        ProxyFix::default().apply(&mut req);
        assert_eq!(peer(&req).ip(), "198.51.100.9".parse::<IpAddr>().unwrap());

        let mut req = request(&[("x-forwarded-for", "1.1.1.1, 198.51.100.9")]);
        ProxyFix { trusted_proxies: 2 }.apply(&mut req);
        assert_eq!(peer(&req).ip(), "1.1.1.1".parse::<IpAddr>().unwrap());

        // chain shorter than the trusted hop count
        let mut req = request(&[("x-forwarded-for", "1.1.1.1")]);
        ProxyFix { trusted_proxies: 2 }.apply(&mut req);
        assert_eq!(peer(&req).ip(), "10.0.0.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_without_headers_keeps_connection() {
        let mut req = request(&[("host", "localhost:5000")]);
        ProxyFix::default().apply(&mut req);

        assert_eq!(peer(&req), SocketAddr::from(([10, 0, 0, 2], 41000)));
        let origin = req.extensions().get::<ClientOrigin>().unwrap();
        assert_eq!(origin.scheme, "http");
        assert_eq!(origin.host.as_deref(), Some("localhost:5000"));
        assert_eq!(origin.ip, Some("10.0.0.2".parse().unwrap()));
    }

    #[test]
    fn test_garbage_forwarded_for_is_ignored() {
        let mut req = request(&[("x-forwarded-for", "not-an-ip")]);
        ProxyFix::default().apply(&mut req);
        assert_eq!(peer(&req).ip(), "10.0.0.2".parse::<IpAddr>().unwrap());
    }
}
