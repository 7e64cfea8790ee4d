/// Secret store backed by Postgres. Every query is scoped by owner so a
/// caller can never reach another user's rows.
use crate::db::SecretStore;
use crate::error::Result;
use crate::models::{NewSecret, Secret, SecretMetadata};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgSecretStore {
    pool: PgPool,
}

impl PgSecretStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecretStore for PgSecretStore {
    async fn insert(&self, secret: NewSecret) -> Result<Secret> {
        let row = sqlx::query_as::<_, Secret>(
            r#"
            INSERT INTO secrets (id, name, description, encrypted_data, created_by, created_at, updated_at)
            VALUES (uuid_generate_v4(), $1, $2, $3, $4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(&secret.name)
        .bind(&secret.description)
        .bind(&secret.encrypted_data)
        .bind(secret.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<SecretMetadata>> {
        let rows = sqlx::query_as::<_, SecretMetadata>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM secrets
            WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn fetch_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Secret>> {
        let row = sqlx::query_as::<_, Secret>(
            "SELECT * FROM secrets WHERE id = $1 AND created_by = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(
            "DELETE FROM secrets WHERE id = $1 AND created_by = $2 RETURNING name",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name)
    }
}
