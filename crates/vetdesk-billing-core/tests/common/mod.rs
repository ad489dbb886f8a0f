//! Common test utilities for vetdesk-billing-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::MockDb;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use vetdesk_billing_core::{BillingConfig, BillingService, ManualClock};

/// Noon UTC on 2025-01-01
#[allow(dead_code)]
pub fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// Billing service over a fresh in-memory store and a manual clock
#[allow(dead_code)]
pub fn test_service(config: BillingConfig) -> (BillingService, MockDb, Arc<ManualClock>) {
    let db = MockDb::new();
    let clock = Arc::new(ManualClock::new(new_year()));
    let service = BillingService::new(db.stores(), config, clock.clone());
    (service, db, clock)
}
