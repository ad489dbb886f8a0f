//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use vetdesk_types::{
    Clinic, ClinicId, Invoice, InvoiceId, InvoiceNumber, InvoiceStatus, RoleSet,
    SubscriptionStatus, TrialWindow, UserId,
};

use crate::error::{DbError, DbResult};

/// Clinic row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ClinicRow {
    pub id: Uuid,
    pub name: String,
    pub subscription_status: String,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collaborator row from the database
#[derive(Debug, Clone, FromRow)]
pub struct CollaboratorRow {
    pub clinic_id: Uuid,
    pub user_id: Uuid,
    pub roles: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice row from the database
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub invoice_number: String,
    pub date_key: String,
    pub sequence: i64,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClinicRow {
    /// Convert to domain ClinicId
    pub fn clinic_id(&self) -> ClinicId {
        ClinicId(self.id)
    }

    /// Parsed subscription status
    pub fn status(&self) -> DbResult<SubscriptionStatus> {
        self.subscription_status
            .parse()
            .map_err(|e: vetdesk_types::SubscriptionStatusParseError| {
                DbError::Corrupt(e.to_string())
            })
    }

    /// Subscription state used for trial evaluation
    pub fn trial_window(&self) -> DbResult<TrialWindow> {
        Ok(TrialWindow {
            subscription_status: self.status()?,
            trial_end_date: self.trial_end_date,
        })
    }

    /// Convert to the domain clinic
    pub fn to_clinic(&self) -> DbResult<Clinic> {
        Ok(Clinic {
            id: self.clinic_id(),
            name: self.name.clone(),
            subscription_status: self.status()?,
            trial_end_date: self.trial_end_date,
            created_at: self.created_at,
        })
    }
}

impl CollaboratorRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Parsed role set
    pub fn role_set(&self) -> RoleSet {
        RoleSet::parse(&self.roles)
    }
}

impl InvoiceRow {
    /// Convert to the domain invoice
    pub fn to_invoice(&self) -> DbResult<Invoice> {
        let number: InvoiceNumber = self
            .invoice_number
            .parse()
            .map_err(|e: vetdesk_types::VetDeskError| DbError::Corrupt(e.to_string()))?;
        let status: InvoiceStatus = self
            .status
            .parse()
            .map_err(|e: vetdesk_types::VetDeskError| DbError::Corrupt(e.to_string()))?;

        Ok(Invoice {
            id: InvoiceId(self.id),
            clinic_id: ClinicId(self.clinic_id),
            number,
            status,
            amount_cents: self.amount_cents,
            currency: self.currency.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
        })
    }
}
