//! Store collaborators for the custody core.
//!
//! Each trait is the contract with the relational store for one resource;
//! the `Pg*` implementations are thin sqlx repositories. Services depend on
//! the traits, so storage can be mocked in tests and swapped by the host.

use crate::error::Result;
use crate::models::{
    AuditEvent, NewAuditEvent, NewSecret, Role, Secret, SecretMetadata, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub mod audit;
pub mod roles;
pub mod secrets;
pub mod users;

pub use audit::PgAuditStore;
pub use roles::PgRoleStore;
pub use secrets::PgSecretStore;
pub use users::PgIdentityStore;

/// Identity store operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<()>;
    async fn set_totp_secret(&self, id: Uuid, secret: &str) -> Result<()>;
}

/// Role-binding lookup and assignment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn has_role(&self, user_id: Uuid, role_name: &str) -> Result<bool>;
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>>;
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> Result<()>;
}

/// Secret store operations, always scoped by owner
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn insert(&self, secret: NewSecret) -> Result<Secret>;
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<SecretMetadata>>;
    async fn fetch_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<Secret>>;
    /// Deletes in one statement and returns the removed secret's name, or
    /// `None` when the id does not exist or belongs to another owner.
    async fn delete_for_owner(&self, id: Uuid, owner: Uuid) -> Result<Option<String>>;
}

/// Append-only audit trail
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, event: NewAuditEvent) -> Result<()>;
    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<AuditEvent>>;
    async fn list_for_actor(&self, actor: Uuid, limit: i64, offset: i64)
        -> Result<Vec<AuditEvent>>;
}

/// Run the embedded schema migrations. Called by the hosting process at
/// startup, before any store is used.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| crate::error::CustodyError::Database(e.to_string()))
}
