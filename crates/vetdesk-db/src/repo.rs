//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Clinic repository trait
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    /// Find a clinic by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClinicRow>>;

    /// Create a new clinic
    async fn create(&self, clinic: CreateClinic) -> DbResult<ClinicRow>;

    /// Update subscription status. Returns `NotFound` if no such clinic.
    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()>;
}

/// Create clinic input
#[derive(Debug, Clone)]
pub struct CreateClinic {
    pub id: Uuid,
    pub name: String,
    pub subscription_status: String,
    pub trial_end_date: Option<DateTime<Utc>>,
}

/// Collaborator repository trait
#[async_trait]
pub trait CollaboratorRepository: Send + Sync {
    /// Find a user's membership in a clinic
    async fn find(&self, clinic_id: Uuid, user_id: Uuid) -> DbResult<Option<CollaboratorRow>>;

    /// All collaborators of a clinic
    async fn find_by_clinic_id(&self, clinic_id: Uuid) -> DbResult<Vec<CollaboratorRow>>;

    /// Insert or replace a user's roles in a clinic
    async fn upsert_roles(
        &self,
        clinic_id: Uuid,
        user_id: Uuid,
        roles: &str,
    ) -> DbResult<CollaboratorRow>;
}

/// Invoice repository trait
///
/// Every lookup is scoped by clinic so one tenant never reads another's invoices.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Find an invoice by ID within a clinic
    async fn find_by_id(&self, clinic_id: Uuid, id: Uuid) -> DbResult<Option<InvoiceRow>>;

    /// Newest invoices of a clinic
    async fn find_by_clinic_id(&self, clinic_id: Uuid, limit: i64) -> DbResult<Vec<InvoiceRow>>;

    /// Create a new invoice. Returns `Conflict` if the number is taken.
    async fn create(&self, invoice: CreateInvoice) -> DbResult<InvoiceRow>;
}

/// Create invoice input
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub invoice_number: String,
    pub date_key: String,
    pub sequence: i64,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
}

/// Per-(clinic, day) invoice counter
#[async_trait]
pub trait InvoiceSequenceRepository: Send + Sync {
    /// Atomically allocate the next sequence value for a clinic and day.
    ///
    /// The first allocation for a key starts after the highest sequence
    /// already stored on invoices for that key (1 if there are none).
    async fn next_sequence(&self, clinic_id: Uuid, date_key: &str) -> DbResult<i64>;
}
