/// Append-only audit trail backed by Postgres
use crate::db::AuditStore;
use crate::error::{CustodyError, Result};
use crate::models::{AuditEvent, NewAuditEvent};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, event: NewAuditEvent) -> Result<()> {
        let details = serde_json::to_value(&event.detail)
            .map_err(|e| CustodyError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (id, user_id, action, resource, resource_id, details, ip_address, user_agent, created_at)
            VALUES
                (uuid_generate_v4(), $1, $2, $3, $4, $5, $6, $7, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(event.actor_id)
        .bind(event.action.as_str())
        .bind(event.action.resource_type())
        .bind(event.resource_id)
        .bind(details)
        .bind(&event.origin.ip_address)
        .bind(&event.origin.user_agent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT *
            FROM audit_logs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_for_actor(
        &self,
        actor: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT *
            FROM audit_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(actor)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
