//! User administration: listing, inspection, activation and role binding.

use crate::db::{IdentityStore, RoleStore};
use crate::error::{CustodyError, Result};
use crate::models::{AuditAction, AuditDetail, RequestOrigin, Role, UserSummary};
use crate::services::access::{AccessGate, Capability};
use crate::services::audit::AuditRecorder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Full administrative view of one identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRoles {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub totp_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

#[derive(Clone)]
pub struct UserService {
    identities: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
    gate: AccessGate,
    audit: AuditRecorder,
}

impl UserService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
        gate: AccessGate,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            identities,
            roles,
            gate,
            audit,
        }
    }

    /// List identities. Requires user management rights.
    pub async fn list(
        &self,
        actor: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
        origin: &RequestOrigin,
    ) -> Result<Vec<UserSummary>> {
        self.gate.require(actor, Capability::ManageUsers).await?;

        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 1000);
        let offset = offset.unwrap_or(0).max(0);

        let users = self.identities.list(limit, offset).await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::UsersList,
                None,
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Inspect one identity with its role bindings. Actors may always read
    /// themselves; reading anyone else requires user management rights.
    pub async fn get(
        &self,
        actor: Uuid,
        target: Uuid,
        origin: &RequestOrigin,
    ) -> Result<UserWithRoles> {
        if actor != target {
            self.gate.require(actor, Capability::ManageUsers).await?;
        }

        let user = self
            .identities
            .find_by_id(target)
            .await?
            .ok_or(CustodyError::UserNotFound)?;
        let roles = self.roles.roles_for_user(target).await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::UserRead,
                Some(target),
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(UserWithRoles {
            id: user.id,
            is_active: user.is_active,
            totp_enabled: user.totp_enabled(),
            created_at: user.created_at,
            username: user.username,
            email: user.email,
            roles,
        })
    }

    /// Activate or deactivate an identity. Requires user management rights.
    pub async fn set_active(
        &self,
        actor: Uuid,
        target: Uuid,
        is_active: bool,
        origin: &RequestOrigin,
    ) -> Result<()> {
        self.gate.require(actor, Capability::ManageUsers).await?;

        self.identities.set_active(target, is_active).await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::UserUpdate,
                Some(target),
                AuditDetail::UserUpdated { is_active },
                origin,
            )
            .await;

        Ok(())
    }

    /// Bind a role to an identity. Requires role assignment rights.
    /// Re-assigning an already bound role succeeds without effect.
    pub async fn assign_role(
        &self,
        actor: Uuid,
        target: Uuid,
        role_id: Uuid,
        origin: &RequestOrigin,
    ) -> Result<()> {
        self.gate.require(actor, Capability::AssignRoles).await?;

        self.identities
            .find_by_id(target)
            .await?
            .ok_or(CustodyError::UserNotFound)?;

        self.roles.assign_role(target, role_id).await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::AssignRole,
                Some(target),
                AuditDetail::RoleAssigned { role_id },
                origin,
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockAuditStore, MockIdentityStore, MockRoleStore};
    use crate::models::User;
    use mockall::predicate::eq;

    fn origin() -> RequestOrigin {
        RequestOrigin {
            ip_address: "10.0.0.1".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    fn role(name: &str) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn user(id: Uuid) -> User {
        User {
            id,
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: "aa:bb".to_string(),
            totp_secret: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn admin_roles() -> MockRoleStore {
        let mut roles = MockRoleStore::new();
        roles
            .expect_roles_for_user()
            .returning(|_| Ok(vec![role("admin")]));
        roles
    }

    fn no_roles() -> MockRoleStore {
        let mut roles = MockRoleStore::new();
        roles.expect_roles_for_user().returning(|_| Ok(vec![]));
        roles
    }

    fn recorder_expecting(action: AuditAction) -> AuditRecorder {
        let mut store = MockAuditStore::new();
        store
            .expect_append()
            .withf(move |event| event.action == action)
            .times(1)
            .returning(|_| Ok(()));
        AuditRecorder::new(Arc::new(store))
    }

    fn recorder_expecting_nothing() -> AuditRecorder {
        let mut store = MockAuditStore::new();
        store.expect_append().times(0);
        AuditRecorder::new(Arc::new(store))
    }

    #[tokio::test]
    async fn listing_requires_management_rights() {
        let mut identities = MockIdentityStore::new();
        identities.expect_list().times(0);

        let roles = Arc::new(no_roles());
        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            recorder_expecting_nothing(),
        );

        let err = service
            .list(Uuid::new_v4(), None, None, &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::AuthorizationDenied));
    }

    #[tokio::test]
    async fn admin_lists_summaries_without_sensitive_fields() {
        let mut identities = MockIdentityStore::new();
        identities
            .expect_list()
            .with(eq(100), eq(0))
            .returning(|_, _| Ok(vec![user(Uuid::new_v4())]));

        let roles = Arc::new(admin_roles());
        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            recorder_expecting(AuditAction::UsersList),
        );

        let listed = service
            .list(Uuid::new_v4(), None, None, &origin())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "bob");
    }

    #[tokio::test]
    async fn anyone_may_read_themselves() {
        let actor = Uuid::new_v4();

        let mut identities = MockIdentityStore::new();
        identities
            .expect_find_by_id()
            .with(eq(actor))
            .returning(move |id| Ok(Some(user(id))));

        let roles = Arc::new(no_roles());
        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            recorder_expecting(AuditAction::UserRead),
        );

        let read = service.get(actor, actor, &origin()).await.unwrap();
        assert_eq!(read.id, actor);
        assert!(read.roles.is_empty());
    }

    #[tokio::test]
    async fn reading_another_user_requires_management_rights() {
        let mut identities = MockIdentityStore::new();
        identities.expect_find_by_id().times(0);

        let roles = Arc::new(no_roles());
        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            recorder_expecting_nothing(),
        );

        let err = service
            .get(Uuid::new_v4(), Uuid::new_v4(), &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::AuthorizationDenied));
    }

    #[tokio::test]
    async fn deactivation_is_audited_with_the_new_state() {
        let target = Uuid::new_v4();

        let mut identities = MockIdentityStore::new();
        identities
            .expect_set_active()
            .with(eq(target), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut audit_store = MockAuditStore::new();
        audit_store
            .expect_append()
            .withf(|event| {
                event.action == AuditAction::UserUpdate
                    && event.detail == AuditDetail::UserUpdated { is_active: false }
            })
            .times(1)
            .returning(|_| Ok(()));

        let roles = Arc::new(admin_roles());
        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            AuditRecorder::new(Arc::new(audit_store)),
        );

        service
            .set_active(Uuid::new_v4(), target, false, &origin())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn role_assignment_checks_target_exists() {
        let mut identities = MockIdentityStore::new();
        identities.expect_find_by_id().returning(|_| Ok(None));

        let mut roles = admin_roles();
        roles.expect_assign_role().times(0);
        let roles = Arc::new(roles);

        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            recorder_expecting_nothing(),
        );

        let err = service
            .assign_role(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::UserNotFound));
    }

    #[tokio::test]
    async fn role_assignment_is_audited_with_the_role() {
        let target = Uuid::new_v4();
        let role_id = Uuid::new_v4();

        let mut identities = MockIdentityStore::new();
        identities
            .expect_find_by_id()
            .returning(move |id| Ok(Some(user(id))));

        let mut roles = admin_roles();
        roles
            .expect_assign_role()
            .with(eq(target), eq(role_id))
            .times(1)
            .returning(|_, _| Ok(()));
        let roles = Arc::new(roles);

        let mut audit_store = MockAuditStore::new();
        audit_store
            .expect_append()
            .withf(move |event| {
                event.action == AuditAction::AssignRole
                    && event.detail == AuditDetail::RoleAssigned { role_id }
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(
            Arc::new(identities),
            roles.clone(),
            AccessGate::new(roles),
            AuditRecorder::new(Arc::new(audit_store)),
        );

        service
            .assign_role(Uuid::new_v4(), target, role_id, &origin())
            .await
            .unwrap();
    }
}
