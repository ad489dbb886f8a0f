//! Invoice number allocation
//!
//! Numbers have the form `YYYYMMDD-NNN`, one sequence per clinic and day.
//! The counter is bumped by a single atomic store operation, so concurrent
//! requests for the same clinic never receive the same number.

use std::sync::Arc;

use vetdesk_db::InvoiceSequenceRepository;
use vetdesk_types::{ClinicId, DateKey, InvoiceNumber, InvoiceSequenceKey};

use crate::clock::Clock;
use crate::BillingError;

/// Allocates invoice numbers from a per-(clinic, day) counter
#[derive(Clone)]
pub struct InvoiceNumberAllocator {
    store: Arc<dyn InvoiceSequenceRepository>,
    clock: Arc<dyn Clock>,
}

impl InvoiceNumberAllocator {
    /// Create a new allocator
    pub fn new(store: Arc<dyn InvoiceSequenceRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Allocate the next number for a clinic on the current (UTC) day
    pub async fn allocate(&self, clinic_id: &ClinicId) -> Result<InvoiceNumber, BillingError> {
        let key = InvoiceSequenceKey::new(*clinic_id, DateKey::from_utc(self.clock.now()));
        self.allocate_for(key).await
    }

    /// Allocate the next number for an explicit sequence key
    pub async fn allocate_for(&self, key: InvoiceSequenceKey) -> Result<InvoiceNumber, BillingError> {
        let date_key = key.date_key.to_string();
        let value = self
            .store
            .next_sequence(key.clinic_id.0, &date_key)
            .await?;

        let sequence = u32::try_from(value)
            .ok()
            .filter(|seq| *seq > 0)
            .ok_or_else(|| {
                BillingError::Internal(format!(
                    "sequence {value} out of range for clinic {} on {date_key}",
                    key.clinic_id
                ))
            })?;

        metrics::counter!("clinic_invoice_numbers_allocated_total").increment(1);

        Ok(InvoiceNumber::new(key.date_key, sequence))
    }
}

impl std::fmt::Debug for InvoiceNumberAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceNumberAllocator").finish_non_exhaustive()
    }
}
