//! Liveness and readiness checks

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Table the invoice allocator cannot work without
const REQUIRED_TABLE: &str = "public.invoice_sequences";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub schema: &'static str,
}

impl ReadyResponse {
    fn not_ready(database: &'static str, schema: &'static str) -> (StatusCode, Json<Self>) {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(Self {
                status: "not_ready",
                database,
                schema,
            }),
        )
    }
}

/// Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: env!("CARGO_PKG_NAME"),
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check: the database answers and migrations have been applied
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let migrated = sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(REQUIRED_TABLE)
        .fetch_one(&state.pool)
        .await;

    match migrated {
        Ok(true) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                database: "connected",
                schema: "migrated",
            }),
        ),
        Ok(false) => {
            tracing::warn!(table = REQUIRED_TABLE, "Database reachable but schema missing");
            ReadyResponse::not_ready("connected", "missing")
        }
        Err(e) => {
            tracing::error!(error = ?e, "Database readiness check failed");
            ReadyResponse::not_ready("unavailable", "unknown")
        }
    }
}
