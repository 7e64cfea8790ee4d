//! Secret custody: envelope encryption at rest, owner-scoped access.
//!
//! Plaintext exists only inside `create` and `get`; everything that touches
//! the store carries the sealed envelope.

use crate::db::SecretStore;
use crate::error::{CustodyError, Result};
use crate::models::{
    AuditAction, AuditDetail, CreateSecretRequest, NewSecret, RequestOrigin, SecretMetadata,
    SecretRevealed,
};
use crate::security::cipher;
use crate::security::keys::KeyProvider;
use crate::services::audit::AuditRecorder;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct SecretService {
    secrets: Arc<dyn SecretStore>,
    keys: Arc<dyn KeyProvider>,
    audit: AuditRecorder,
}

impl SecretService {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        keys: Arc<dyn KeyProvider>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            secrets,
            keys,
            audit,
        }
    }

    /// Seal and store a new secret owned by the actor.
    pub async fn create(
        &self,
        actor: Uuid,
        request: CreateSecretRequest,
        origin: &RequestOrigin,
    ) -> Result<SecretMetadata> {
        request.validate()?;

        let key = self.keys.data_key()?;
        let encrypted_data = cipher::encrypt(request.data.as_bytes(), &key)?;

        let secret = self
            .secrets
            .insert(NewSecret {
                name: request.name,
                description: request.description,
                encrypted_data,
                created_by: actor,
            })
            .await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::SecretCreate,
                Some(secret.id),
                AuditDetail::SecretCreated {
                    name: secret.name.clone(),
                },
                origin,
            )
            .await;

        Ok(SecretMetadata {
            id: secret.id,
            name: secret.name,
            description: secret.description,
            created_by: secret.created_by,
            created_at: secret.created_at,
            updated_at: secret.updated_at,
        })
    }

    /// List the actor's secrets. Metadata only, nothing is unsealed.
    pub async fn list(&self, actor: Uuid, origin: &RequestOrigin) -> Result<Vec<SecretMetadata>> {
        let secrets = self.secrets.list_for_owner(actor).await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::SecretsList,
                None,
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(secrets)
    }

    /// Unseal one secret for its owner.
    ///
    /// A secret owned by someone else reports plain not-found, identical to
    /// one that does not exist.
    pub async fn get(
        &self,
        actor: Uuid,
        id: Uuid,
        origin: &RequestOrigin,
    ) -> Result<SecretRevealed> {
        let secret = self
            .secrets
            .fetch_for_owner(id, actor)
            .await?
            .ok_or(CustodyError::SecretNotFound)?;

        let key = self.keys.data_key()?;
        let plaintext = cipher::decrypt(&secret.encrypted_data, &key)?;
        let data = String::from_utf8(plaintext).map_err(|_| CustodyError::DecryptionFailure)?;

        self.audit
            .record(
                Some(actor),
                AuditAction::SecretRead,
                Some(secret.id),
                AuditDetail::SecretRead {
                    name: secret.name.clone(),
                },
                origin,
            )
            .await;

        Ok(SecretRevealed {
            id: secret.id,
            name: secret.name,
            description: secret.description,
            data,
            created_by: secret.created_by,
            created_at: secret.created_at,
            updated_at: secret.updated_at,
        })
    }

    /// Delete one of the actor's secrets. A single owner-scoped statement
    /// removes the row and hands back the name for the audit event.
    pub async fn delete(&self, actor: Uuid, id: Uuid, origin: &RequestOrigin) -> Result<()> {
        let name = self
            .secrets
            .delete_for_owner(id, actor)
            .await?
            .ok_or(CustodyError::SecretNotFound)?;

        self.audit
            .record(
                Some(actor),
                AuditAction::SecretDelete,
                Some(id),
                AuditDetail::SecretDeleted { name },
                origin,
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockAuditStore, MockSecretStore};
    use crate::models::Secret;
    use crate::security::keys::{generate_data_key, StaticKeyProvider};
    use chrono::Utc;

    fn origin() -> RequestOrigin {
        RequestOrigin {
            ip_address: "10.0.0.1".to_string(),
            user_agent: "test-agent".to_string(),
        }
    }

    fn provider() -> Arc<StaticKeyProvider> {
        Arc::new(StaticKeyProvider::from_base64(&generate_data_key()).unwrap())
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

    fn stored_secret(owner: Uuid, name: &str, envelope: &str) -> Secret {
        Secret {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            encrypted_data: envelope.to_string(),
            created_by: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_stores_sealed_envelope_not_plaintext() {
        let actor = Uuid::new_v4();
        let keys = provider();

        let mut store = MockSecretStore::new();
        store
            .expect_insert()
            .withf(|new| {
                new.encrypted_data != "hunter2" && !new.encrypted_data.contains("hunter2")
            })
            .times(1)
            .returning(move |new| Ok(stored_secret(new.created_by, &new.name, &new.encrypted_data)));

        let service = SecretService::new(
            Arc::new(store),
            keys,
            recorder_expecting(AuditAction::SecretCreate),
        );

        let metadata = service
            .create(
                actor,
                CreateSecretRequest {
                    name: "db-password".to_string(),
                    description: String::new(),
                    data: "hunter2".to_string(),
                },
                &origin(),
            )
            .await
            .unwrap();

        assert_eq!(metadata.name, "db-password");
        assert_eq!(metadata.created_by, actor);
    }

    #[tokio::test]
    async fn get_unseals_back_to_original_plaintext() {
        let actor = Uuid::new_v4();
        let keys = provider();
        let envelope = cipher::encrypt(b"hunter2", &keys.data_key().unwrap()).unwrap();
        let secret = stored_secret(actor, "db-password", &envelope);

        let mut store = MockSecretStore::new();
        store
            .expect_fetch_for_owner()
            .returning(move |_, _| Ok(Some(secret.clone())));

        let service = SecretService::new(
            Arc::new(store),
            keys,
            recorder_expecting(AuditAction::SecretRead),
        );

        let revealed = service.get(actor, Uuid::new_v4(), &origin()).await.unwrap();
        assert_eq!(revealed.data, "hunter2");
    }

    #[tokio::test]
    async fn foreign_or_missing_secret_reads_as_not_found() {
        let mut store = MockSecretStore::new();
        store.expect_fetch_for_owner().returning(|_, _| Ok(None));

        let service =
            SecretService::new(Arc::new(store), provider(), recorder_expecting_nothing());

        let err = service
            .get(Uuid::new_v4(), Uuid::new_v4(), &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::SecretNotFound));
    }

    #[tokio::test]
    async fn get_with_wrong_key_fails_closed() {
        let actor = Uuid::new_v4();
        let sealing_keys = provider();
        let envelope = cipher::encrypt(b"hunter2", &sealing_keys.data_key().unwrap()).unwrap();
        let secret = stored_secret(actor, "db-password", &envelope);

        let mut store = MockSecretStore::new();
        store
            .expect_fetch_for_owner()
            .returning(move |_, _| Ok(Some(secret.clone())));

        // Different provider, different key
        let service =
            SecretService::new(Arc::new(store), provider(), recorder_expecting_nothing());

        let err = service
            .get(actor, Uuid::new_v4(), &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::DecryptionFailure));
    }

    #[tokio::test]
    async fn delete_audits_with_the_secret_name() {
        let actor = Uuid::new_v4();

        let mut store = MockSecretStore::new();
        store.expect_fetch_for_owner().times(0);
        store
            .expect_delete_for_owner()
            .times(1)
            .returning(|_, _| Ok(Some("db-password".to_string())));

        let mut audit_store = MockAuditStore::new();
        audit_store
            .expect_append()
            .withf(|event| {
                event.action == AuditAction::SecretDelete
                    && event.detail
                        == AuditDetail::SecretDeleted {
                            name: "db-password".to_string(),
                        }
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = SecretService::new(
            Arc::new(store),
            provider(),
            AuditRecorder::new(Arc::new(audit_store)),
        );

        service
            .delete(actor, Uuid::new_v4(), &origin())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deleting_a_foreign_or_missing_secret_is_not_found() {
        let mut store = MockSecretStore::new();
        store.expect_delete_for_owner().returning(|_, _| Ok(None));

        let service =
            SecretService::new(Arc::new(store), provider(), recorder_expecting_nothing());

        let err = service
            .delete(Uuid::new_v4(), Uuid::new_v4(), &origin())
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::SecretNotFound));
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let mut store = MockSecretStore::new();
        store.expect_insert().times(0);

        let service =
            SecretService::new(Arc::new(store), provider(), recorder_expecting_nothing());

        let err = service
            .create(
                Uuid::new_v4(),
                CreateSecretRequest {
                    name: String::new(),
                    description: String::new(),
                    data: "x".to_string(),
                },
                &origin(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CustodyError::Validation(_)));
    }
}
