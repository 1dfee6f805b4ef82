//! Rate limiting for the login and registration forms.
//!
//! Keyed by client IP. The limits come from [`RateLimitConfig`] so they can
//! be tuned per deployment (and raised in tests).

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use thiserror::Error;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

/// Key extractor that prefers proxy headers and falls back to the peer
/// address.
///
/// Order: `X-Forwarded-For` (first entry), `X-Real-IP`, then the socket peer
/// recorded by `into_make_service_with_connect_info`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        };

        let peer = || {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        };

        forwarded
            .or_else(real_ip)
            .or_else(peer)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// The configured limits were rejected by `governor`.
#[derive(Debug, Error)]
#[error("invalid rate limit: one request per {per_second}s with burst {burst_size}")]
pub struct InvalidRateLimit {
    per_second: u64,
    burst_size: u32,
}

/// Create the rate limiter for the auth form posts.
///
/// With the defaults this allows a burst of 5 and then one request every
/// 6 seconds per client.
///
/// # Errors
///
/// Returns `InvalidRateLimit` if either limit is zero.
pub fn auth_rate_limiter(limits: &RateLimitConfig) -> Result<RateLimiterLayer, InvalidRateLimit> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(limits.per_second)
        .burst_size(limits.burst_size)
        .finish()
        .ok_or(InvalidRateLimit {
            per_second: limits.per_second,
            burst_size: limits.burst_size,
        })?;
    Ok(GovernorLayer::new(Arc::new(config)))
}
