//! PostgreSQL repository implementations

mod clinic;
mod collaborator;
mod invoice;
mod invoice_sequence;

pub use clinic::PgClinicRepository;
pub use collaborator::PgCollaboratorRepository;
pub use invoice::PgInvoiceRepository;
pub use invoice_sequence::PgInvoiceSequenceRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub clinics: PgClinicRepository,
    pub collaborators: PgCollaboratorRepository,
    pub invoices: PgInvoiceRepository,
    pub invoice_sequences: PgInvoiceSequenceRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            clinics: PgClinicRepository::new(pool.clone()),
            collaborators: PgCollaboratorRepository::new(pool.clone()),
            invoices: PgInvoiceRepository::new(pool.clone()),
            invoice_sequences: PgInvoiceSequenceRepository::new(pool),
        }
    }
}
