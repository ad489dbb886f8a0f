//! PostgreSQL clinic repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::ClinicRow;
use crate::repo::{ClinicRepository, CreateClinic};

/// PostgreSQL clinic repository
#[derive(Clone)]
pub struct PgClinicRepository {
    pool: PgPool,
}

impl PgClinicRepository {
    /// Create a new clinic repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicRepository for PgClinicRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClinicRow>> {
        let clinic = sqlx::query_as::<_, ClinicRow>(
            r#"
            SELECT id, name, subscription_status, trial_end_date, created_at, updated_at
            FROM clinics
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clinic)
    }

    async fn create(&self, clinic: CreateClinic) -> DbResult<ClinicRow> {
        let row = sqlx::query_as::<_, ClinicRow>(
            r#"
            INSERT INTO clinics (id, name, subscription_status, trial_end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, subscription_status, trial_end_date, created_at, updated_at
            "#,
        )
        .bind(clinic.id)
        .bind(&clinic.name)
        .bind(&clinic.subscription_status)
        .bind(clinic.trial_end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE clinics SET subscription_status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
