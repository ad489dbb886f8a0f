//! Application state for the Clinic API service.

use std::sync::Arc;

use vetdesk_billing_core::BillingService;
use vetdesk_db::DbPool;

use crate::config::Config;
use crate::rate_limit::IpRateLimiter;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Clinic billing service (trials, roles, invoices)
    pub billing: Arc<BillingService>,
    /// Database pool (readiness check)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
    /// Per-IP request limiter
    pub rate_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    /// Create new application state
    pub fn new(billing: BillingService, pool: DbPool, config: Config) -> Self {
        let rate_limiter = IpRateLimiter::new(config.rate_limit_per_minute, config.rate_limit_burst);
        Self {
            billing: Arc::new(billing),
            pool,
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}
