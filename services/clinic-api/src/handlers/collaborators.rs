//! Collaborator role handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

use vetdesk_types::{Role, RoleSet};

use super::shared::{parse_clinic_id, parse_user_id, record_op_duration};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetRolesRequest {
    pub actor_id: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub clinic_id: String,
    pub user_id: String,
    pub roles: Vec<Role>,
    pub effective_role: Option<Role>,
}

/// PUT /api/v1/clinics/{clinic_id}/collaborators/{user_id}/roles
#[instrument(skip(state, req), fields(clinic_id = %clinic_id, user_id = %user_id, actor_id = %req.actor_id))]
pub async fn set_roles(
    State(state): State<AppState>,
    Path((clinic_id, user_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<SetRolesRequest>,
) -> ApiResult<Json<RolesResponse>> {
    let start = Instant::now();

    let clinic_id = parse_clinic_id(&clinic_id)?;
    let target = parse_user_id(&user_id, "user_id")?;
    let actor = parse_user_id(&req.actor_id, "actor_id")?;

    // Unknown names are a client error here, unlike stored role text
    let roles = RoleSet::parse_strict(&req.roles.join(","))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let result = state.billing.set_roles(&clinic_id, &actor, &target, roles).await;
    record_op_duration("set_roles", start, result.is_ok());
    let roles = result?;

    Ok(Json(RolesResponse {
        clinic_id: clinic_id.to_string(),
        user_id: target.to_string(),
        effective_role: roles.effective_role(),
        roles: roles.iter().collect(),
    }))
}
