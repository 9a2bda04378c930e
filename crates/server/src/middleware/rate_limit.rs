//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the login endpoint is limited: it is the one place an anonymous caller
//! can probe employee IDs.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor for the client address.
///
/// Keys on the TCP peer address, which requires the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`. When
/// `trust_proxy_headers` is set the client address is taken from
/// `CF-Connecting-IP`, the first hop of `X-Forwarded-For` or `X-Real-IP`, in
/// that order. Only enable it behind a proxy that overwrites those headers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

fn proxy_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    header_ip(req, "cf-connecting-ip")
        .or_else(|| header_ip(req, "x-forwarded-for"))
        .or_else(|| header_ip(req, "x-real-ip"))
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy_headers {
            proxy_ip(req)
        } else {
            None
        };

        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the login endpoint: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const TRUSTED: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };

    fn from_peer(peer: &str) -> Request<Body> {
        let mut req = Request::builder()
            .header("x-forwarded-for", "198.51.100.1")
            .header("cf-connecting-ip", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_ignores_proxy_headers_by_default() {
        let ip = ClientIpKeyExtractor::default()
            .extract(&from_peer("192.0.2.44:51000"))
            .unwrap();
        assert_eq!(ip, "192.0.2.44".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_untrusted_without_peer_is_an_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.1")
            .body(Body::empty())
            .unwrap();
        assert!(ClientIpKeyExtractor::default().extract(&req).is_err());
    }

    #[test]
    fn test_trusted_prefers_cloudflare_header() {
        let ip = TRUSTED.extract(&from_peer("192.0.2.44:51000")).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_uses_first_forwarded_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "198.51.100.1, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        let ip = TRUSTED.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_falls_back_to_peer_address() {
        let mut req = Request::builder()
            .header("x-real-ip", "not-an-ip")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.44:51000".parse::<SocketAddr>().unwrap()));
        let ip = TRUSTED.extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.44".parse::<IpAddr>().unwrap());
    }
}
