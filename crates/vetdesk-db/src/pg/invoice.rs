//! PostgreSQL invoice repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::InvoiceRow;
use crate::repo::{CreateInvoice, InvoiceRepository};

/// PostgreSQL invoice repository
#[derive(Clone)]
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    /// Create a new invoice repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn find_by_id(&self, clinic_id: Uuid, id: Uuid) -> DbResult<Option<InvoiceRow>> {
        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, clinic_id, invoice_number, date_key, sequence, status,
                   amount_cents, currency, description, created_at
            FROM invoices
            WHERE clinic_id = $1 AND id = $2
            "#,
        )
        .bind(clinic_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn find_by_clinic_id(&self, clinic_id: Uuid, limit: i64) -> DbResult<Vec<InvoiceRow>> {
        let invoices = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, clinic_id, invoice_number, date_key, sequence, status,
                   amount_cents, currency, description, created_at
            FROM invoices
            WHERE clinic_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(clinic_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    async fn create(&self, invoice: CreateInvoice) -> DbResult<InvoiceRow> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            INSERT INTO invoices (id, clinic_id, invoice_number, date_key, sequence,
                                  amount_cents, currency, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, clinic_id, invoice_number, date_key, sequence, status,
                      amount_cents, currency, description, created_at
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.clinic_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.date_key)
        .bind(invoice.sequence)
        .bind(invoice.amount_cents)
        .bind(&invoice.currency)
        .bind(&invoice.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
