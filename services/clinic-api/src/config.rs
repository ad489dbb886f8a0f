//! Configuration for the Clinic API service.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use vetdesk_billing_core::BillingConfig;
use vetdesk_db::PoolOptions;

/// Clinic API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Connection pool sizing
    pub pool: PoolOptions,
    /// Billing core configuration
    pub billing: BillingConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
    /// Requests per minute allowed per client IP
    pub rate_limit_per_minute: NonZeroU32,
    /// Burst allowance per client IP
    pub rate_limit_burst: NonZeroU32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        // Database
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;

        // Server
        let http_port: u16 = parse_or(&lookup, "HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        // Metrics
        let metrics_enabled: bool = parse_or(&lookup, "METRICS_ENABLED", true)?;

        // Trial and invoicing
        let trial_length_days: u32 = parse_or(&lookup, "TRIAL_LENGTH_DAYS", 14)?;
        let notification_days: u32 = parse_or(&lookup, "TRIAL_NOTIFICATION_DAYS", 14)?;
        let allocation_attempts: u32 = parse_or(&lookup, "INVOICE_ALLOCATION_ATTEMPTS", 3)?;

        // Rate limiting
        let rate_limit_per_minute: NonZeroU32 = parse_or(
            &lookup,
            "RATE_LIMIT_PER_MINUTE",
            NonZeroU32::MIN.saturating_add(119),
        )?;
        let rate_limit_burst: NonZeroU32 =
            parse_or(&lookup, "RATE_LIMIT_BURST", NonZeroU32::MIN.saturating_add(29))?;

        let billing = BillingConfig::default()
            .with_trial_length_days(trial_length_days)
            .with_notification_days(notification_days)
            .with_invoice_allocation_attempts(allocation_attempts);

        Ok(Self {
            http_port,
            database_url,
            pool: PoolOptions {
                max_connections,
                ..PoolOptions::default()
            },
            billing,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            rate_limit_per_minute,
            rate_limit_burst,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
