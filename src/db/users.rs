/// Identity store backed by Postgres
use crate::db::IdentityStore;
use crate::error::{CustodyError, Result};
use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_active, created_at, updated_at)
            VALUES (uuid_generate_v4(), $1, $2, $3, TRUE, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CustodyError::Conflict("Username or email already exists".to_string())
            }
            _ => CustodyError::from(e),
        })?;

        Ok(user)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT *
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CustodyError::UserNotFound);
        }

        Ok(())
    }

    async fn set_totp_secret(&self, id: Uuid, secret: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET totp_secret = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(secret)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CustodyError::UserNotFound);
        }

        Ok(())
    }
}
