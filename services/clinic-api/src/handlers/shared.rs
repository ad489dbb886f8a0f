//! Shared handler utilities
//!
//! Identifier parsing, input validation and metrics helpers used across
//! handlers.

use std::time::Instant;

use vetdesk_types::{ClinicId, InvoiceId, UserId};

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for clinic names
pub const MAX_CLINIC_NAME_LEN: usize = 120;

/// Maximum length for invoice descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Page size when the caller gives none
pub const DEFAULT_LIST_LIMIT: i64 = 20;

pub fn parse_clinic_id(raw: &str) -> Result<ClinicId, ApiError> {
    ClinicId::parse(raw).map_err(|_| ApiError::BadRequest("Invalid clinic_id".into()))
}

pub fn parse_invoice_id(raw: &str) -> Result<InvoiceId, ApiError> {
    InvoiceId::parse(raw).map_err(|_| ApiError::BadRequest("Invalid invoice_id".into()))
}

/// Parse a user identifier, naming the offending field on failure.
pub fn parse_user_id(raw: &str, field_name: &str) -> Result<UserId, ApiError> {
    UserId::parse(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {field_name}")))
}

/// Validate a clinic display name.
pub fn validate_clinic_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Clinic name cannot be empty".into()));
    }
    if name.chars().count() > MAX_CLINIC_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Clinic name too long (max {MAX_CLINIC_NAME_LEN} chars)"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ApiError::BadRequest(
            "Clinic name contains control characters".into(),
        ));
    }
    Ok(())
}

/// Validate a user-provided string is within safe bounds.
pub fn validate_string_length(value: &str, field_name: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{field_name} too long (max {max} chars)"
        )));
    }
    Ok(())
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record HTTP operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "clinic_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_clinic_name_valid() {
        assert!(validate_clinic_name("Happy Paws").is_ok());
        assert!(validate_clinic_name("  Clínica Veterinária São Bento ").is_ok());
        assert!(validate_clinic_name(&"a".repeat(MAX_CLINIC_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_clinic_name_invalid() {
        // Empty
        assert!(validate_clinic_name("").is_err());
        assert!(validate_clinic_name("   ").is_err());

        // Too long
        assert!(validate_clinic_name(&"a".repeat(MAX_CLINIC_NAME_LEN + 1)).is_err());

        // Control characters
        assert!(validate_clinic_name("Happy\nPaws").is_err());
        assert!(validate_clinic_name("Happy\u{0}Paws").is_err());
    }

    #[test]
    fn test_validate_string_length_counts_chars() {
        assert!(validate_string_length("short", "description", 5).is_ok());
        assert!(validate_string_length("ééééé", "description", 5).is_ok());
        assert!(validate_string_length("toolong", "description", 5).is_err());
    }

    #[test]
    fn test_parse_ids() {
        let id = uuid::Uuid::new_v4().to_string();
        assert!(parse_clinic_id(&id).is_ok());
        assert!(parse_invoice_id(&id).is_ok());
        assert!(parse_user_id(&id, "actor_id").is_ok());

        assert!(parse_clinic_id("clinic-1").is_err());
        assert!(parse_invoice_id("").is_err());

        let err = parse_user_id("nope", "actor_id").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Invalid actor_id");
    }
}
