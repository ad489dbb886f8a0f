//! Billing configuration

use std::time::Duration;

/// Billing service configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Length of a new clinic's trial
    pub trial_length_days: u32,
    /// Trial banner is shown when this many days or fewer remain
    pub notification_days: u32,
    /// How many numbers to try before giving up on an invoice insert
    pub invoice_allocation_attempts: u32,
    /// How long a clinic's subscription state may be served from cache
    pub trial_cache_ttl: Duration,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            trial_length_days: 14,
            notification_days: 14,
            invoice_allocation_attempts: 3,
            trial_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl BillingConfig {
    /// Set trial length
    pub fn with_trial_length_days(mut self, days: u32) -> Self {
        self.trial_length_days = days;
        self
    }

    /// Set notification window
    pub fn with_notification_days(mut self, days: u32) -> Self {
        self.notification_days = days;
        self
    }

    /// Set invoice allocation attempts (at least one)
    pub fn with_invoice_allocation_attempts(mut self, attempts: u32) -> Self {
        self.invoice_allocation_attempts = attempts.max(1);
        self
    }

    /// Set subscription cache TTL
    pub fn with_trial_cache_ttl(mut self, ttl: Duration) -> Self {
        self.trial_cache_ttl = ttl;
        self
    }
}
