//! PostgreSQL invoice sequence counter

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repo::InvoiceSequenceRepository;

/// PostgreSQL invoice sequence repository
#[derive(Clone)]
pub struct PgInvoiceSequenceRepository {
    pool: PgPool,
}

impl PgInvoiceSequenceRepository {
    /// Create a new sequence repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceSequenceRepository for PgInvoiceSequenceRepository {
    async fn next_sequence(&self, clinic_id: Uuid, date_key: &str) -> DbResult<i64> {
        // Single statement: the row lock taken by ON CONFLICT serializes
        // concurrent allocations for the same (clinic, day).
        // GREATEST keeps the counter ahead of invoices inserted without it.
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_sequences (clinic_id, date_key, last_value)
            SELECT $1, $2, COALESCE(MAX(sequence), 0) + 1
            FROM invoices
            WHERE clinic_id = $1 AND date_key = $2
            ON CONFLICT (clinic_id, date_key)
            DO UPDATE SET last_value = GREATEST(invoice_sequences.last_value, EXCLUDED.last_value - 1) + 1,
                          updated_at = NOW()
            RETURNING last_value
            "#,
        )
        .bind(clinic_id)
        .bind(date_key)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(%clinic_id, date_key, value, "Allocated invoice sequence");

        Ok(value)
    }
}
