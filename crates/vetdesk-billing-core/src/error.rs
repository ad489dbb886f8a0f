//! Billing errors

use thiserror::Error;
use vetdesk_types::Permission;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Clinic not found
    #[error("clinic not found")]
    ClinicNotFound,

    /// Invoice not found (or belongs to another clinic)
    #[error("invoice not found")]
    InvoiceNotFound,

    /// User is not a collaborator of the clinic
    #[error("collaborator not found")]
    CollaboratorNotFound,

    /// Collaborator lacks a permission
    #[error("permission denied: requires {0}")]
    PermissionDenied(Permission),

    /// Trial has ended and no paid subscription is active
    #[error("trial expired")]
    TrialExpired,

    /// Role assignment rejected
    #[error("invalid roles: {0}")]
    InvalidRoles(String),

    /// Change would leave the clinic without an owner
    #[error("clinic must keep at least one owner")]
    LastOwner,

    /// Invalid request input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every allocated invoice number collided with an existing invoice
    #[error("could not allocate a free invoice number after {attempts} attempts")]
    AllocationExhausted {
        /// Attempts made
        attempts: u32,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] vetdesk_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
