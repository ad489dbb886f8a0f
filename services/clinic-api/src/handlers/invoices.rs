//! Invoice handlers
//!
//! Every route here checks the acting collaborator's permission and then the
//! clinic's trial access, in that order.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

use vetdesk_billing_core::NewInvoice;
use vetdesk_types::{ClinicId, Invoice, Permission, UserId};

use super::shared::{
    parse_clinic_id, parse_invoice_id, parse_user_id, record_op_duration,
    validate_string_length, DEFAULT_LIST_LIMIT, MAX_DESCRIPTION_LEN,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NextNumberRequest {
    pub actor_id: String,
}

#[derive(Debug, Serialize)]
pub struct NextNumberResponse {
    pub invoice_number: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub actor_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub actor_id: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub actor_id: String,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub clinic_id: String,
    pub invoice_number: String,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
    pub invoices: Vec<InvoiceResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/clinics/{clinic_id}/invoices/next-number
#[instrument(skip(state, req), fields(clinic_id = %clinic_id, actor_id = %req.actor_id))]
pub async fn next_invoice_number(
    State(state): State<AppState>,
    Path(clinic_id): Path<String>,
    ApiJson(req): ApiJson<NextNumberRequest>,
) -> ApiResult<Json<NextNumberResponse>> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let actor = parse_user_id(&req.actor_id, "actor_id")?;
    guard(&state, &clinic_id, &actor, Permission::ManageInvoices).await?;

    let result = state.billing.next_invoice_number(&clinic_id).await;
    record_op_duration("next_invoice_number", start, result.is_ok());
    let number = result?;

    Ok(Json(NextNumberResponse {
        invoice_number: number.to_string(),
    }))
}

/// POST /api/v1/clinics/{clinic_id}/invoices
#[instrument(skip(state, req), fields(clinic_id = %clinic_id, actor_id = %req.actor_id, amount_cents = req.amount_cents))]
pub async fn create_invoice(
    State(state): State<AppState>,
    Path(clinic_id): Path<String>,
    ApiJson(req): ApiJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceResponse>)> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let actor = parse_user_id(&req.actor_id, "actor_id")?;
    if let Some(description) = &req.description {
        validate_string_length(description, "description", MAX_DESCRIPTION_LEN)?;
    }
    guard(&state, &clinic_id, &actor, Permission::ManageInvoices).await?;

    let result = state
        .billing
        .create_invoice(
            &clinic_id,
            NewInvoice {
                amount_cents: req.amount_cents,
                currency: req.currency,
                description: req.description,
            },
        )
        .await;
    record_op_duration("create_invoice", start, result.is_ok());
    let invoice = result?;

    Ok((StatusCode::CREATED, Json(invoice_to_response(invoice))))
}

/// GET /api/v1/clinics/{clinic_id}/invoices
#[instrument(skip(state, query), fields(clinic_id = %clinic_id, actor_id = %query.actor_id, limit))]
pub async fn list_invoices(
    State(state): State<AppState>,
    Path(clinic_id): Path<String>,
    ApiQuery(query): ApiQuery<ListInvoicesQuery>,
) -> ApiResult<Json<ListInvoicesResponse>> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let actor = parse_user_id(&query.actor_id, "actor_id")?;
    guard(&state, &clinic_id, &actor, Permission::ViewRecords).await?;

    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 100);
    tracing::Span::current().record("limit", limit);

    let result = state.billing.list_invoices(&clinic_id, limit).await;
    record_op_duration("list_invoices", start, result.is_ok());

    Ok(Json(ListInvoicesResponse {
        invoices: result?.into_iter().map(invoice_to_response).collect(),
    }))
}

/// GET /api/v1/clinics/{clinic_id}/invoices/{invoice_id}
#[instrument(skip(state, query), fields(clinic_id = %clinic_id, invoice_id = %invoice_id))]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path((clinic_id, invoice_id)): Path<(String, String)>,
    ApiQuery(query): ApiQuery<ActorQuery>,
) -> ApiResult<Json<InvoiceResponse>> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let invoice_id = parse_invoice_id(&invoice_id)?;
    let actor = parse_user_id(&query.actor_id, "actor_id")?;
    guard(&state, &clinic_id, &actor, Permission::ViewRecords).await?;

    let result = state.billing.get_invoice(&clinic_id, &invoice_id).await;
    record_op_duration("get_invoice", start, result.is_ok());

    Ok(Json(invoice_to_response(result?)))
}

/// Permission first, so outsiders never learn a clinic's trial state.
async fn guard(
    state: &AppState,
    clinic_id: &ClinicId,
    actor: &UserId,
    permission: Permission,
) -> ApiResult<()> {
    state.billing.authorize(clinic_id, actor, permission).await?;
    state.billing.ensure_access(clinic_id).await?;
    Ok(())
}

fn invoice_to_response(inv: Invoice) -> InvoiceResponse {
    InvoiceResponse {
        id: inv.id.to_string(),
        clinic_id: inv.clinic_id.to_string(),
        invoice_number: inv.number.to_string(),
        status: inv.status.as_str().to_string(),
        amount_cents: inv.amount_cents,
        currency: inv.currency,
        description: inv.description,
        created_at: inv.created_at.to_rfc3339(),
    }
}
