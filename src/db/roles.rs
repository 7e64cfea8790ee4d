/// Role-binding store backed by Postgres
use crate::db::RoleStore;
use crate::error::Result;
use crate::models::Role;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn has_role(&self, user_id: Uuid, role_name: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = $1 AND r.name = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(role_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.id, r.name, r.description, r.created_at
            FROM roles r
            JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<()> {
        // Idempotent: re-assigning an existing binding is a no-op
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
