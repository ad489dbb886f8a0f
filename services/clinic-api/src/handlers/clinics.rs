//! Clinic and subscription handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

use vetdesk_types::{Clinic, Permission, TrialStatus};

use super::shared::{parse_clinic_id, parse_user_id, record_op_duration, validate_clinic_name};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateClinicRequest {
    pub actor_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivateSubscriptionRequest {
    pub actor_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClinicResponse {
    pub id: String,
    pub name: String,
    pub subscription_status: String,
    pub trial_end_date: Option<String>,
    pub created_at: String,
    pub trial: TrialStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/clinics/{clinic_id}/trial-status
#[instrument(skip(state), fields(clinic_id = %clinic_id))]
pub async fn get_trial_status(
    State(state): State<AppState>,
    Path(clinic_id): Path<String>,
) -> ApiResult<Json<TrialStatus>> {
    let start = Instant::now();
    let clinic_id = parse_clinic_id(&clinic_id)?;

    let result = state.billing.trial_status(&clinic_id).await;
    record_op_duration("get_trial_status", start, result.is_ok());

    Ok(Json(result?))
}

/// POST /api/v1/clinics
#[instrument(skip(state, req), fields(actor_id = %req.actor_id))]
pub async fn create_clinic(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateClinicRequest>,
) -> ApiResult<(StatusCode, Json<ClinicResponse>)> {
    let start = Instant::now();

    let owner = parse_user_id(&req.actor_id, "actor_id")?;
    validate_clinic_name(&req.name)?;

    let result = state.billing.start_trial(&req.name, &owner).await;
    record_op_duration("create_clinic", start, result.is_ok());
    let clinic = result?;

    tracing::info!(clinic_id = %clinic.id, owner = %owner, "Clinic created on trial");

    let response = clinic_response(&state, clinic).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/clinics/{clinic_id}/subscription/activate
#[instrument(skip(state, req), fields(clinic_id = %clinic_id, actor_id = %req.actor_id))]
pub async fn activate_subscription(
    State(state): State<AppState>,
    Path(clinic_id): Path<String>,
    ApiJson(req): ApiJson<ActivateSubscriptionRequest>,
) -> ApiResult<Json<ClinicResponse>> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let actor = parse_user_id(&req.actor_id, "actor_id")?;

    state
        .billing
        .authorize(&clinic_id, &actor, Permission::ManageBilling)
        .await?;

    let result = state.billing.activate_subscription(&clinic_id).await;
    record_op_duration("activate_subscription", start, result.is_ok());
    let clinic = result?;

    metrics::counter!("clinic_subscriptions_activated_total").increment(1);

    Ok(Json(clinic_response(&state, clinic).await?))
}

async fn clinic_response(state: &AppState, clinic: Clinic) -> ApiResult<ClinicResponse> {
    let trial = state.billing.trial_status(&clinic.id).await?;

    Ok(ClinicResponse {
        id: clinic.id.to_string(),
        name: clinic.name,
        subscription_status: clinic.subscription_status.to_string(),
        trial_end_date: clinic.trial_end_date.map(|t| t.to_rfc3339()),
        created_at: clinic.created_at.to_rfc3339(),
        trial,
    })
}
