//! Common error types

use thiserror::Error;

/// Common errors across VetDesk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VetDeskError {
    /// Invoice number not in `YYYYMMDD-NNN` form
    #[error("invalid invoice number: {0}")]
    InvalidInvoiceNumber(String),

    /// Unknown invoice status
    #[error("invalid invoice status: {0}")]
    InvalidInvoiceStatus(String),

    /// Unknown role name
    #[error("invalid role: {0}")]
    InvalidRole(String),
}
