//! In-memory repositories for testing

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use vetdesk_billing_core::BillingStores;
use vetdesk_db::{
    ClinicRepository, ClinicRow, CollaboratorRepository, CollaboratorRow, CreateClinic,
    CreateInvoice, DbError, DbResult, InvoiceRepository, InvoiceRow, InvoiceSequenceRepository,
};

/// In-memory database implementing every repository the billing service needs
#[derive(Default, Clone)]
pub struct MockDb {
    clinics: Arc<DashMap<Uuid, ClinicRow>>,
    collaborators: Arc<DashMap<(Uuid, Uuid), CollaboratorRow>>,
    invoices: Arc<DashMap<Uuid, InvoiceRow>>,
    invoice_numbers: Arc<DashMap<(Uuid, String), Uuid>>,
    sequences: Arc<DashMap<(Uuid, String), i64>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository handles backed by this store
    pub fn stores(&self) -> BillingStores {
        let db = Arc::new(self.clone());
        BillingStores {
            clinics: db.clone(),
            collaborators: db.clone(),
            invoices: db.clone(),
            invoice_sequences: db,
        }
    }

    /// Insert a clinic row directly
    #[allow(dead_code)]
    pub fn insert_clinic(&self, row: ClinicRow) {
        self.clinics.insert(row.id, row);
    }

    /// Insert an invoice row directly, bypassing the counter
    #[allow(dead_code)]
    pub fn insert_invoice(&self, row: InvoiceRow) {
        self.invoice_numbers
            .insert((row.clinic_id, row.invoice_number.clone()), row.id);
        self.invoices.insert(row.id, row);
    }

    /// Build an invoice row for seeding
    #[allow(dead_code)]
    pub fn invoice_row(clinic_id: Uuid, date_key: &str, sequence: i64) -> InvoiceRow {
        InvoiceRow {
            id: Uuid::new_v4(),
            clinic_id,
            invoice_number: format!("{date_key}-{sequence:03}"),
            date_key: date_key.to_string(),
            sequence,
            status: "open".to_string(),
            amount_cents: 1_000,
            currency: "eur".to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Number of stored invoices
    #[allow(dead_code)]
    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    fn stored_max_sequence(&self, clinic_id: Uuid, date_key: &str) -> Option<i64> {
        self.invoices
            .iter()
            .filter(|r| r.clinic_id == clinic_id && r.date_key == date_key)
            .map(|r| r.sequence)
            .max()
    }
}

#[async_trait]
impl ClinicRepository for MockDb {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClinicRow>> {
        Ok(self.clinics.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, clinic: CreateClinic) -> DbResult<ClinicRow> {
        let row = ClinicRow {
            id: clinic.id,
            name: clinic.name,
            subscription_status: clinic.subscription_status,
            trial_end_date: clinic.trial_end_date,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.clinics.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()> {
        let mut clinic = self.clinics.get_mut(&id).ok_or(DbError::NotFound)?;
        clinic.subscription_status = status.to_string();
        clinic.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl CollaboratorRepository for MockDb {
    async fn find(&self, clinic_id: Uuid, user_id: Uuid) -> DbResult<Option<CollaboratorRow>> {
        Ok(self
            .collaborators
            .get(&(clinic_id, user_id))
            .map(|r| r.value().clone()))
    }

    async fn find_by_clinic_id(&self, clinic_id: Uuid) -> DbResult<Vec<CollaboratorRow>> {
        let mut rows: Vec<_> = self
            .collaborators
            .iter()
            .filter(|r| r.clinic_id == clinic_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn upsert_roles(
        &self,
        clinic_id: Uuid,
        user_id: Uuid,
        roles: &str,
    ) -> DbResult<CollaboratorRow> {
        let now = Utc::now();
        let mut row = self
            .collaborators
            .entry((clinic_id, user_id))
            .or_insert_with(|| CollaboratorRow {
                clinic_id,
                user_id,
                roles: String::new(),
                created_at: now,
                updated_at: now,
            });
        row.roles = roles.to_string();
        row.updated_at = now;
        Ok(row.value().clone())
    }
}

#[async_trait]
impl InvoiceRepository for MockDb {
    async fn find_by_id(&self, clinic_id: Uuid, id: Uuid) -> DbResult<Option<InvoiceRow>> {
        Ok(self
            .invoices
            .get(&id)
            .filter(|r| r.clinic_id == clinic_id)
            .map(|r| r.value().clone()))
    }

    async fn find_by_clinic_id(&self, clinic_id: Uuid, limit: i64) -> DbResult<Vec<InvoiceRow>> {
        let mut rows: Vec<_> = self
            .invoices
            .iter()
            .filter(|r| r.clinic_id == clinic_id)
            .map(|r| r.value().clone())
            .collect();
        // created_at can tie within a test; sequence keeps the order stable
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn create(&self, invoice: CreateInvoice) -> DbResult<InvoiceRow> {
        match self
            .invoice_numbers
            .entry((invoice.clinic_id, invoice.invoice_number.clone()))
        {
            Entry::Occupied(_) => {
                return Err(DbError::Conflict("invoices_clinic_number_key".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(invoice.id);
            }
        }

        let row = InvoiceRow {
            id: invoice.id,
            clinic_id: invoice.clinic_id,
            invoice_number: invoice.invoice_number,
            date_key: invoice.date_key,
            sequence: invoice.sequence,
            status: "open".to_string(),
            amount_cents: invoice.amount_cents,
            currency: invoice.currency,
            description: invoice.description,
            created_at: Utc::now(),
        };
        self.invoices.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl InvoiceSequenceRepository for MockDb {
    async fn next_sequence(&self, clinic_id: Uuid, date_key: &str) -> DbResult<i64> {
        let floor = self.stored_max_sequence(clinic_id, date_key).unwrap_or(0);
        // The entry guard holds the shard lock, so the bump is atomic per key
        let mut last = self
            .sequences
            .entry((clinic_id, date_key.to_string()))
            .or_insert(0);
        *last = (*last).max(floor) + 1;
        Ok(*last)
    }
}
