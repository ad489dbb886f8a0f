//! Per-client rate limiting using the governor crate.
//!
//! The limiter lives in [`AppState`] so every router (and every test) gets
//! its own buckets.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::error::ApiError;
use crate::state::AppState;

/// Rate limiter keyed by client IP address.
pub struct IpRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
}

impl IpRateLimiter {
    /// Allow `per_minute` requests per IP with bursts of up to `burst`.
    #[must_use]
    pub fn new(per_minute: NonZeroU32, burst: NonZeroU32) -> Self {
        Self::with_quota(Quota::per_minute(per_minute).allow_burst(burst))
    }

    /// Create a limiter from an explicit quota.
    #[must_use]
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    /// Check if a request from `ip` is allowed.
    pub fn check_ip(&self, ip: IpAddr) -> Result<(), ApiError> {
        match self.limiter.check_key(&ip) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.clock.now());
                Err(ApiError::RateLimited {
                    retry_after_secs: wait_time.as_secs(),
                })
            }
        }
    }

    /// Drop buckets that have fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of tracked client buckets.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for IpRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpRateLimiter")
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Middleware rejecting clients over their quota with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(e) = state.rate_limiter.check_ip(addr.ip()) {
        tracing::warn!(client_ip = %addr.ip(), "Rate limit exceeded");
        metrics::counter!("clinic_rate_limited_total").increment(1);
        return Err(e);
    }
    Ok(next.run(request).await)
}
