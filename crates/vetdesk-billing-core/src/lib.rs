//! VetDesk Billing Core - Subscription and invoicing logic
//!
//! - Trial status evaluation (pure, clock injected)
//! - Per-clinic, per-day invoice number allocation
//! - Clinic subscription lifecycle and collaborator authorization
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vetdesk_billing_core::{BillingConfig, BillingService, BillingStores, SystemClock};
//! use vetdesk_db::Repositories;
//!
//! let stores = BillingStores::from(Repositories::new(pool));
//! let billing = BillingService::new(stores, BillingConfig::default(), Arc::new(SystemClock));
//!
//! let status = billing.trial_status(&clinic_id).await?;
//! let number = billing.next_invoice_number(&clinic_id).await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod invoice;
pub mod service;
pub mod trial;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BillingConfig;
pub use error::BillingError;
pub use invoice::InvoiceNumberAllocator;
pub use service::{BillingService, BillingStores, NewInvoice};
pub use trial::{days_until, evaluate_trial, TrialStatusEvaluator};
