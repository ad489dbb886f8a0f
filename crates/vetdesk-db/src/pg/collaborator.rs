//! PostgreSQL collaborator repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::CollaboratorRow;
use crate::repo::CollaboratorRepository;

/// PostgreSQL collaborator repository
#[derive(Clone)]
pub struct PgCollaboratorRepository {
    pool: PgPool,
}

impl PgCollaboratorRepository {
    /// Create a new collaborator repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollaboratorRepository for PgCollaboratorRepository {
    async fn find(&self, clinic_id: Uuid, user_id: Uuid) -> DbResult<Option<CollaboratorRow>> {
        let row = sqlx::query_as::<_, CollaboratorRow>(
            r#"
            SELECT clinic_id, user_id, roles, created_at, updated_at
            FROM collaborators
            WHERE clinic_id = $1 AND user_id = $2
            "#,
        )
        .bind(clinic_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_clinic_id(&self, clinic_id: Uuid) -> DbResult<Vec<CollaboratorRow>> {
        let rows = sqlx::query_as::<_, CollaboratorRow>(
            r#"
            SELECT clinic_id, user_id, roles, created_at, updated_at
            FROM collaborators
            WHERE clinic_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(clinic_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_roles(
        &self,
        clinic_id: Uuid,
        user_id: Uuid,
        roles: &str,
    ) -> DbResult<CollaboratorRow> {
        let row = sqlx::query_as::<_, CollaboratorRow>(
            r#"
            INSERT INTO collaborators (clinic_id, user_id, roles)
            VALUES ($1, $2, $3)
            ON CONFLICT (clinic_id, user_id)
            DO UPDATE SET roles = EXCLUDED.roles, updated_at = NOW()
            RETURNING clinic_id, user_id, roles, created_at, updated_at
            "#,
        )
        .bind(clinic_id)
        .bind(user_id)
        .bind(roles)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
