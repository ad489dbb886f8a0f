//! Error types for the Clinic API service.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vetdesk_billing_core::BillingError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Clinic not found")]
    ClinicNotFound,

    #[error("Invoice not found")]
    InvoiceNotFound,

    #[error("Collaborator not found")]
    CollaboratorNotFound,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Trial period has expired")]
    TrialExpired,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error")]
    Database(#[from] vetdesk_db::DbError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ClinicNotFound | Self::InvoiceNotFound | Self::CollaboratorNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::TrialExpired => StatusCode::PAYMENT_REQUIRED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ClinicNotFound => "CLINIC_NOT_FOUND",
            Self::InvoiceNotFound => "INVOICE_NOT_FOUND",
            Self::CollaboratorNotFound => "COLLABORATOR_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::TrialExpired => "TRIAL_EXPIRED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Internal(_) | Self::Database(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::ClinicNotFound => Self::ClinicNotFound,
            BillingError::InvoiceNotFound => Self::InvoiceNotFound,
            BillingError::CollaboratorNotFound => Self::CollaboratorNotFound,
            BillingError::PermissionDenied(permission) => {
                Self::Forbidden(format!("requires {permission}"))
            }
            BillingError::TrialExpired => Self::TrialExpired,
            BillingError::InvalidRoles(msg) | BillingError::InvalidInput(msg) => {
                Self::BadRequest(msg)
            }
            BillingError::LastOwner => {
                Self::Conflict("clinic must keep at least one owner".into())
            }
            BillingError::AllocationExhausted { attempts } => Self::Conflict(format!(
                "no free invoice number after {attempts} attempts"
            )),
            BillingError::Database(e) => Self::Database(e),
            BillingError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors
        if matches!(self, Self::Internal(_) | Self::Database(_)) {
            tracing::error!(error = ?self, "Internal API error");
        }

        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use vetdesk_types::Permission;

    #[test]
    fn test_billing_errors_map_to_status() {
        let cases = [
            (BillingError::ClinicNotFound, StatusCode::NOT_FOUND, "CLINIC_NOT_FOUND"),
            (BillingError::InvoiceNotFound, StatusCode::NOT_FOUND, "INVOICE_NOT_FOUND"),
            (
                BillingError::PermissionDenied(Permission::ManageInvoices),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (BillingError::TrialExpired, StatusCode::PAYMENT_REQUIRED, "TRIAL_EXPIRED"),
            (
                BillingError::InvalidRoles("empty".into()),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (BillingError::LastOwner, StatusCode::CONFLICT, "CONFLICT"),
            (
                BillingError::AllocationExhausted { attempts: 3 },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                BillingError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (billing, status, code) in cases {
            let api = ApiError::from(billing);
            assert_eq!(api.status_code(), status);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn test_forbidden_names_permission() {
        let api = ApiError::from(BillingError::PermissionDenied(Permission::ManageBilling));
        assert_eq!(api.to_string(), "Forbidden: requires manage_billing");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after_secs: 7 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }

    #[test]
    fn test_retry_after_is_at_least_one_second() {
        let response = ApiError::RateLimited { retry_after_secs: 0 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }
}
