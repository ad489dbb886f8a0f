//! Billing service - ties together trial checks, invoicing and collaborator roles

use std::sync::Arc;

use chrono::Duration;
use moka::future::Cache;
use uuid::Uuid;

use vetdesk_db::{
    ClinicRepository, CollaboratorRepository, CreateClinic, CreateInvoice, DbError,
    InvoiceRepository, InvoiceSequenceRepository, Repositories,
};
use vetdesk_types::{
    Clinic, ClinicId, Invoice, InvoiceId, InvoiceNumber, Permission, Role, RoleSet,
    SubscriptionStatus, TrialStatus, TrialWindow, UserId,
};

use crate::clock::Clock;
use crate::config::BillingConfig;
use crate::invoice::InvoiceNumberAllocator;
use crate::trial::TrialStatusEvaluator;
use crate::BillingError;

/// Storage backends used by the billing service
#[derive(Clone)]
pub struct BillingStores {
    pub clinics: Arc<dyn ClinicRepository>,
    pub collaborators: Arc<dyn CollaboratorRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub invoice_sequences: Arc<dyn InvoiceSequenceRepository>,
}

impl From<Repositories> for BillingStores {
    fn from(repos: Repositories) -> Self {
        Self {
            clinics: Arc::new(repos.clinics),
            collaborators: Arc::new(repos.collaborators),
            invoices: Arc::new(repos.invoices),
            invoice_sequences: Arc::new(repos.invoice_sequences),
        }
    }
}

/// New invoice input
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Amount in cents
    pub amount_cents: i64,
    /// ISO currency code
    pub currency: String,
    /// Free-text description
    pub description: Option<String>,
}

/// Billing service
///
/// Provides:
/// - Trial status for a clinic (subscription state cached briefly)
/// - Subscription lifecycle (start trial, activate, suspend, cancel)
/// - Invoice numbering and creation
/// - Collaborator role lookup and permission checks
pub struct BillingService {
    stores: BillingStores,
    config: BillingConfig,
    clock: Arc<dyn Clock>,
    evaluator: TrialStatusEvaluator,
    allocator: InvoiceNumberAllocator,
    /// Cache of clinic_id -> subscription state
    window_cache: Cache<ClinicId, TrialWindow>,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(stores: BillingStores, config: BillingConfig, clock: Arc<dyn Clock>) -> Self {
        let evaluator = TrialStatusEvaluator::new(clock.clone())
            .with_notification_days(config.notification_days);
        let allocator = InvoiceNumberAllocator::new(stores.invoice_sequences.clone(), clock.clone());
        let window_cache = Cache::builder()
            .time_to_live(config.trial_cache_ttl)
            .max_capacity(10_000)
            .build();

        Self {
            stores,
            config,
            clock,
            evaluator,
            allocator,
            window_cache,
        }
    }

    /// Billing configuration
    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Clinics and subscriptions
    // ------------------------------------------------------------------

    /// Create a clinic on trial and make `owner` its owner
    pub async fn start_trial(&self, name: &str, owner: &UserId) -> Result<Clinic, BillingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BillingError::InvalidInput("clinic name cannot be empty".into()));
        }

        let trial_end = self.clock.now() + Duration::days(i64::from(self.config.trial_length_days));
        let row = self
            .stores
            .clinics
            .create(CreateClinic {
                id: Uuid::new_v4(),
                name: name.to_string(),
                subscription_status: SubscriptionStatus::Trial.as_str().to_string(),
                trial_end_date: Some(trial_end),
            })
            .await?;

        let owner_roles: RoleSet = [Role::Owner].into_iter().collect();
        self.stores
            .collaborators
            .upsert_roles(row.id, owner.0, &owner_roles.to_storage())
            .await?;

        tracing::info!(clinic_id = %row.id, owner = %owner, %trial_end, "Clinic trial started");

        Ok(row.to_clinic()?)
    }

    /// Get a clinic
    pub async fn get_clinic(&self, clinic_id: &ClinicId) -> Result<Clinic, BillingError> {
        let row = self
            .stores
            .clinics
            .find_by_id(clinic_id.0)
            .await?
            .ok_or(BillingError::ClinicNotFound)?;

        Ok(row.to_clinic()?)
    }

    /// Current subscription state of a clinic
    pub async fn trial_window(&self, clinic_id: &ClinicId) -> Result<TrialWindow, BillingError> {
        if let Some(window) = self.window_cache.get(clinic_id).await {
            return Ok(window);
        }

        let row = self
            .stores
            .clinics
            .find_by_id(clinic_id.0)
            .await?
            .ok_or(BillingError::ClinicNotFound)?;
        let window = row.trial_window()?;

        self.window_cache.insert(*clinic_id, window).await;

        Ok(window)
    }

    /// Evaluate a clinic's trial status now
    pub async fn trial_status(&self, clinic_id: &ClinicId) -> Result<TrialStatus, BillingError> {
        let window = self.trial_window(clinic_id).await?;
        let status = self.evaluator.evaluate(&window);

        let result = if status.can_access { "allowed" } else { "blocked" };
        metrics::counter!("clinic_trial_checks_total", "result" => result).increment(1);

        Ok(status)
    }

    /// Fail with [`BillingError::TrialExpired`] unless the clinic may use the app
    pub async fn ensure_access(&self, clinic_id: &ClinicId) -> Result<TrialStatus, BillingError> {
        let status = self.trial_status(clinic_id).await?;
        if !status.can_access {
            return Err(BillingError::TrialExpired);
        }
        Ok(status)
    }

    /// Mark the clinic's subscription as paid
    pub async fn activate_subscription(&self, clinic_id: &ClinicId) -> Result<Clinic, BillingError> {
        self.set_status(clinic_id, SubscriptionStatus::Active).await
    }

    /// Pause access for a clinic
    pub async fn suspend_subscription(&self, clinic_id: &ClinicId) -> Result<Clinic, BillingError> {
        self.set_status(clinic_id, SubscriptionStatus::Suspended).await
    }

    /// End a clinic's subscription
    pub async fn cancel_subscription(&self, clinic_id: &ClinicId) -> Result<Clinic, BillingError> {
        self.set_status(clinic_id, SubscriptionStatus::Cancelled).await
    }

    async fn set_status(
        &self,
        clinic_id: &ClinicId,
        status: SubscriptionStatus,
    ) -> Result<Clinic, BillingError> {
        self.stores
            .clinics
            .update_status(clinic_id.0, status.as_str())
            .await
            .map_err(|e| match e {
                DbError::NotFound => BillingError::ClinicNotFound,
                other => other.into(),
            })?;
        self.window_cache.invalidate(clinic_id).await;

        tracing::info!(clinic_id = %clinic_id, status = %status, "Subscription status changed");

        self.get_clinic(clinic_id).await
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// Roles a user holds in a clinic
    pub async fn roles(&self, clinic_id: &ClinicId, user_id: &UserId) -> Result<RoleSet, BillingError> {
        let row = self
            .stores
            .collaborators
            .find(clinic_id.0, user_id.0)
            .await?
            .ok_or(BillingError::CollaboratorNotFound)?;

        Ok(row.role_set())
    }

    /// Check a user's permission in a clinic, returning their roles on success
    pub async fn authorize(
        &self,
        clinic_id: &ClinicId,
        user_id: &UserId,
        permission: Permission,
    ) -> Result<RoleSet, BillingError> {
        let roles = match self.roles(clinic_id, user_id).await {
            Ok(roles) => roles,
            // Non-members get the same answer as members without the permission
            Err(BillingError::CollaboratorNotFound) => RoleSet::new(),
            Err(e) => return Err(e),
        };

        if !roles.can(permission) {
            tracing::debug!(
                clinic_id = %clinic_id,
                user_id = %user_id,
                %permission,
                effective_role = ?roles.effective_role(),
                "Permission denied"
            );
            return Err(BillingError::PermissionDenied(permission));
        }

        Ok(roles)
    }

    /// Replace a collaborator's roles on behalf of `actor`.
    ///
    /// Only owners may grant `owner` or change an owner's roles, and the
    /// clinic's last owner cannot lose the role.
    pub async fn set_roles(
        &self,
        clinic_id: &ClinicId,
        actor: &UserId,
        target: &UserId,
        roles: RoleSet,
    ) -> Result<RoleSet, BillingError> {
        let actor_roles = self
            .authorize(clinic_id, actor, Permission::ManageCollaborators)
            .await?;

        if roles.is_empty() {
            return Err(BillingError::InvalidRoles("at least one role is required".into()));
        }
        let actor_is_owner = actor_roles.contains(Role::Owner);
        if roles.contains(Role::Owner) && !actor_is_owner {
            return Err(BillingError::PermissionDenied(Permission::ManageClinic));
        }

        let current = match self.roles(clinic_id, target).await {
            Ok(current) => current,
            Err(BillingError::CollaboratorNotFound) => RoleSet::new(),
            Err(e) => return Err(e),
        };
        if current.contains(Role::Owner) {
            if !actor_is_owner {
                return Err(BillingError::PermissionDenied(Permission::ManageClinic));
            }
            if !roles.contains(Role::Owner) && self.owner_count(clinic_id).await? <= 1 {
                return Err(BillingError::LastOwner);
            }
        }

        let row = self
            .stores
            .collaborators
            .upsert_roles(clinic_id.0, target.0, &roles.to_storage())
            .await?;

        tracing::info!(clinic_id = %clinic_id, target = %target, roles = %roles, "Collaborator roles updated");

        Ok(row.role_set())
    }

    async fn owner_count(&self, clinic_id: &ClinicId) -> Result<usize, BillingError> {
        let rows = self.stores.collaborators.find_by_clinic_id(clinic_id.0).await?;
        Ok(rows
            .iter()
            .filter(|row| row.role_set().contains(Role::Owner))
            .count())
    }

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Allocate the next invoice number for a clinic
    pub async fn next_invoice_number(&self, clinic_id: &ClinicId) -> Result<InvoiceNumber, BillingError> {
        self.allocator.allocate(clinic_id).await
    }

    /// Create an invoice with a freshly allocated number.
    ///
    /// A number already taken by another invoice is skipped and a new one
    /// allocated, up to the configured number of attempts.
    pub async fn create_invoice(
        &self,
        clinic_id: &ClinicId,
        invoice: NewInvoice,
    ) -> Result<Invoice, BillingError> {
        if invoice.amount_cents < 0 {
            return Err(BillingError::InvalidInput("amount cannot be negative".into()));
        }
        let currency = invoice.currency.trim().to_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BillingError::InvalidInput(format!(
                "invalid currency: {}",
                invoice.currency
            )));
        }

        let attempts = self.config.invoice_allocation_attempts.max(1);
        for attempt in 1..=attempts {
            let number = self.allocator.allocate(clinic_id).await?;

            let result = self
                .stores
                .invoices
                .create(CreateInvoice {
                    id: Uuid::new_v4(),
                    clinic_id: clinic_id.0,
                    invoice_number: number.to_string(),
                    date_key: number.date_key.to_string(),
                    sequence: i64::from(number.sequence),
                    amount_cents: invoice.amount_cents,
                    currency: currency.clone(),
                    description: invoice.description.clone(),
                })
                .await;

            match result {
                Ok(row) => {
                    tracing::info!(clinic_id = %clinic_id, number = %number, "Invoice created");
                    return Ok(row.to_invoice()?);
                }
                Err(DbError::Conflict(constraint)) => {
                    metrics::counter!("clinic_invoice_number_conflicts_total").increment(1);
                    tracing::warn!(
                        clinic_id = %clinic_id,
                        number = %number,
                        attempt,
                        %constraint,
                        "Invoice number already taken, allocating another"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(BillingError::AllocationExhausted { attempts })
    }

    /// Get an invoice belonging to a clinic
    pub async fn get_invoice(
        &self,
        clinic_id: &ClinicId,
        invoice_id: &InvoiceId,
    ) -> Result<Invoice, BillingError> {
        let row = self
            .stores
            .invoices
            .find_by_id(clinic_id.0, invoice_id.0)
            .await?
            .ok_or(BillingError::InvoiceNotFound)?;

        Ok(row.to_invoice()?)
    }

    /// Newest invoices of a clinic, `limit` clamped to 1..=100
    pub async fn list_invoices(
        &self,
        clinic_id: &ClinicId,
        limit: i64,
    ) -> Result<Vec<Invoice>, BillingError> {
        let rows = self
            .stores
            .invoices
            .find_by_clinic_id(clinic_id.0, limit.clamp(1, 100))
            .await?;

        rows.iter()
            .map(|row| row.to_invoice().map_err(BillingError::from))
            .collect()
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
